//! Trace file configuration and validation.
//!
//! [`TraceConfig`] controls how a recording session writes its trace.
//! Reading never consults it: the reader sniffs the stream to decide
//! whether it is compressed.

use thiserror::Error;

/// Smallest zstd compression level accepted.
pub const MIN_ZSTD_LEVEL: i32 = 1;
/// Largest zstd compression level accepted.
pub const MAX_ZSTD_LEVEL: i32 = 22;

/// Whole-stream compression applied to a trace file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    /// Packets are written as-is.
    None,
    /// The packet stream is wrapped in a single zstd stream.
    Zstd {
        /// Compression level, `1..=22`.
        level: i32,
    },
}

impl Default for Compression {
    fn default() -> Self {
        Self::Zstd { level: 3 }
    }
}

/// Configuration for writing trace files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceConfig {
    /// Stream compression. Default: zstd level 3.
    pub compression: Compression,
    /// Capacity of the file write buffer in bytes. Default: 64 KiB.
    pub write_buffer: usize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
            write_buffer: 64 * 1024,
        }
    }
}

impl TraceConfig {
    /// An uncompressed configuration, mostly useful for inspecting traces.
    pub fn uncompressed() -> Self {
        Self {
            compression: Compression::None,
            ..Self::default()
        }
    }

    /// Check structural invariants before a trace file is created.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Compression::Zstd { level } = self.compression {
            if !(MIN_ZSTD_LEVEL..=MAX_ZSTD_LEVEL).contains(&level) {
                return Err(ConfigError::InvalidZstdLevel { level });
            }
        }
        if self.write_buffer == 0 {
            return Err(ConfigError::ZeroWriteBuffer);
        }
        Ok(())
    }
}

/// Errors detected by [`TraceConfig::validate`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// zstd level outside `1..=22`.
    #[error("zstd level {level} outside 1..=22")]
    InvalidZstdLevel {
        /// The rejected level.
        level: i32,
    },
    /// The write buffer has zero capacity.
    #[error("write buffer capacity is zero")]
    ZeroWriteBuffer,
}
