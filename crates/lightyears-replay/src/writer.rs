//! Trace recording writer.
//!
//! [`TraceWriter`] streams packets to any `Write` sink. [`TraceSink`] is the
//! file-backed sink a recording session owns, optionally zstd-compressed.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::codec::{encode_raw, pack};
use crate::config::{Compression, TraceConfig};
use crate::error::TraceError;
use crate::hash::TraceDigest;
use crate::types::{Scalar, Value};

/// Writes packets to a byte stream, tracking offset and digest.
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and sessions can
/// use a [`TraceSink`].
///
/// # Examples
///
/// ```
/// use lightyears_replay::{TraceReader, TraceWriter, Value};
/// use lightyears_replay::types::RANDOM;
///
/// let mut writer = TraceWriter::new(Vec::new());
/// writer.write(RANDOM.name, RANDOM.format, &[Value::F64(0.5)]).unwrap();
/// let digest = writer.digest();
/// let bytes = writer.into_inner();
///
/// let mut reader = TraceReader::new(bytes.as_slice());
/// let values = reader.read_specific(RANDOM.name, RANDOM.format).unwrap();
/// assert_eq!(values, vec![Value::F64(0.5)]);
/// assert_eq!(reader.digest(), digest);
/// ```
pub struct TraceWriter<W: Write> {
    writer: W,
    offset: u64,
    digest: TraceDigest,
}

impl<W: Write> TraceWriter<W> {
    /// Wrap a sink. Nothing is written until the first packet.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            offset: 0,
            digest: TraceDigest::new(),
        }
    }

    /// Encode and append one packet.
    pub fn write(
        &mut self,
        name: &str,
        format: &[Scalar],
        values: &[Value],
    ) -> Result<(), TraceError> {
        let payload = pack(name, format, values)?;
        let bytes = encode_raw(name, &payload)?;
        self.writer.write_all(&bytes)?;
        let written = bytes.len();
        self.digest.update(name.as_bytes(), &payload);
        tracing::trace!(packet = name, offset = self.offset, len = written, "packet written");
        self.offset += written as u64;
        Ok(())
    }

    /// Uncompressed bytes written so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Digest over every packet written so far.
    pub fn digest(&self) -> TraceDigest {
        self.digest
    }

    /// Number of packets written so far.
    pub fn packets_written(&self) -> u64 {
        self.digest.packets()
    }

    /// Consume the writer and return the underlying `Write` sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// File sink owned by a recording session.
pub enum TraceSink {
    /// Uncompressed packets.
    Plain(BufWriter<File>),
    /// One zstd stream around the packets.
    Zstd(zstd::stream::write::Encoder<'static, BufWriter<File>>),
}

impl TraceSink {
    /// Create (or truncate) `path` and prepare it per `config`.
    pub fn create(path: &Path, config: &TraceConfig) -> Result<Self, TraceError> {
        config.validate()?;
        let file = BufWriter::with_capacity(config.write_buffer, File::create(path)?);
        Ok(match config.compression {
            Compression::None => Self::Plain(file),
            Compression::Zstd { level } => {
                Self::Zstd(zstd::stream::write::Encoder::new(file, level)?)
            }
        })
    }

    /// Finish any compression frame and flush everything to disk.
    pub fn finish(self) -> io::Result<()> {
        match self {
            Self::Plain(mut w) => w.flush(),
            Self::Zstd(encoder) => encoder.finish()?.flush(),
        }
    }
}

impl Write for TraceSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(w) => w.write(buf),
            Self::Zstd(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(w) => w.flush(),
            Self::Zstd(w) => w.flush(),
        }
    }
}
