//! Trace playback reader.
//!
//! [`TraceReader`] decodes packets from any `Read` source with a one-packet
//! lookahead. [`TraceSource`] is the file-backed source a replay session
//! owns; it detects zstd compression from the first bytes of the file.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use crate::codec::{check_packet, decode_next};
use crate::error::TraceError;
use crate::hash::TraceDigest;
use crate::types::{Packet, Scalar, Value};

/// First four bytes of every zstd frame.
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

/// Reads packets from a byte stream.
///
/// Generic over `R: Read` so tests can use `&[u8]` and sessions can use a
/// [`TraceSource`]. Offsets are positions in the uncompressed packet stream.
pub struct TraceReader<R: Read> {
    reader: R,
    /// Offset of the next byte to decode from `reader`.
    stream_offset: u64,
    peeked: Option<Packet>,
    last_offset: u64,
    digest: TraceDigest,
}

impl<R: Read> TraceReader<R> {
    /// Wrap a source positioned at a packet boundary.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            stream_offset: 0,
            peeked: None,
            last_offset: 0,
            digest: TraceDigest::new(),
        }
    }

    fn fetch(&mut self) -> Result<Option<Packet>, TraceError> {
        let packet = decode_next(&mut self.reader, self.stream_offset)?;
        if let Some(p) = &packet {
            self.stream_offset += p.encoded_len() as u64;
            self.digest.update(p.name.as_bytes(), &p.payload);
            tracing::trace!(packet = %p.name, offset = p.offset, "packet read");
        }
        Ok(packet)
    }

    /// Look at the next packet without consuming it.
    ///
    /// `Ok(None)` means the trace is exhausted.
    pub fn peek(&mut self) -> Result<Option<&Packet>, TraceError> {
        if self.peeked.is_none() {
            self.peeked = self.fetch()?;
        }
        Ok(self.peeked.as_ref())
    }

    /// Consume the next packet, or `None` if the trace is exhausted.
    pub fn next_packet(&mut self) -> Result<Option<Packet>, TraceError> {
        let packet = match self.peeked.take() {
            Some(p) => Some(p),
            None => self.fetch()?,
        };
        if let Some(p) = &packet {
            self.last_offset = p.offset;
        }
        Ok(packet)
    }

    /// Consume the next packet, which must be named `name`, and unpack it.
    ///
    /// Fails with [`TraceError::EndOfTrace`] if no packet remains.
    pub fn read_specific(
        &mut self,
        name: &str,
        format: &[Scalar],
    ) -> Result<Vec<Value>, TraceError> {
        match self.next_packet()? {
            Some(packet) => check_packet(&packet, name, format),
            None => Err(TraceError::EndOfTrace {
                offset: self.offset(),
            }),
        }
    }

    /// Offset of the next unconsumed packet.
    pub fn offset(&self) -> u64 {
        match &self.peeked {
            Some(p) => p.offset,
            None => self.stream_offset,
        }
    }

    /// Offset of the most recently consumed packet.
    pub fn last_offset(&self) -> u64 {
        self.last_offset
    }

    /// Digest over every packet decoded so far, including a peeked one.
    pub fn digest(&self) -> TraceDigest {
        self.digest
    }

    /// Convert into a packet iterator.
    pub fn packets(self) -> PacketIter<R> {
        PacketIter {
            reader: self,
            done: false,
        }
    }

    /// Consume the reader and return the underlying source.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Iterator adapter over trace packets.
pub struct PacketIter<R: Read> {
    reader: TraceReader<R>,
    done: bool,
}

impl<R: Read> Iterator for PacketIter<R> {
    type Item = Result<Packet, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_packet() {
            Ok(Some(packet)) => Some(Ok(packet)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// File source owned by a replay session.
pub enum TraceSource {
    /// Uncompressed packets.
    Plain(BufReader<File>),
    /// A zstd stream around the packets.
    Zstd(zstd::stream::read::Decoder<'static, BufReader<File>>),
}

impl TraceSource {
    /// Open `path`, detecting whether it holds a zstd stream.
    pub fn open(path: &Path) -> Result<Self, TraceError> {
        let mut file = BufReader::new(File::open(path)?);
        let compressed = file.fill_buf()?.starts_with(&ZSTD_MAGIC);
        Ok(if compressed {
            Self::Zstd(zstd::stream::read::Decoder::with_buffer(file)?)
        } else {
            Self::Plain(file)
        })
    }

    /// `true` if the file is zstd-compressed.
    pub fn is_compressed(&self) -> bool {
        matches!(self, Self::Zstd(_))
    }
}

impl Read for TraceSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Plain(r) => r.read(buf),
            Self::Zstd(r) => r.read(buf),
        }
    }
}
