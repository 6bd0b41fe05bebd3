//! Error types for trace recording and replay.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::types::Value;

/// Errors raised while recording, replaying, or decoding a trace.
///
/// Apart from [`EndOfTrace`](Self::EndOfTrace), every variant is fatal to
/// the session that raised it: nothing in this crate retries or resumes
/// after a mismatch.
#[derive(Debug, Error)]
pub enum TraceError {
    /// An I/O error occurred while reading or writing the trace.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A packet was required but the trace ended cleanly on a packet
    /// boundary. This is how a complete replay normally terminates.
    #[error("end of trace at offset {offset:#x}")]
    EndOfTrace {
        /// Stream offset of the boundary.
        offset: u64,
    },

    /// The trace ended partway through a packet.
    #[error("truncated trace at offset {offset:#x}: {detail}")]
    Truncated {
        /// Offset of the packet being read.
        offset: u64,
        /// What was short.
        detail: String,
    },

    /// The next packet does not carry the name the caller expected.
    #[error("packet at offset {offset:#x}: expected name '{expected}', read '{found}'")]
    NameMismatch {
        /// Offset of the offending packet.
        offset: u64,
        /// Name the live run asked for.
        expected: String,
        /// Name found in the trace.
        found: String,
    },

    /// The payload does not unpack with the expected format.
    #[error("packet '{name}' at offset {offset:#x}: payload not decoded: {detail}")]
    PayloadDecode {
        /// Offset of the offending packet.
        offset: u64,
        /// Packet name.
        name: String,
        /// Why decoding failed.
        detail: String,
    },

    /// The name matched but the recorded values differ from the live ones.
    #[error(
        "packet '{name}' at offset {offset:#x}: name matched but data did not: \
         expected {expected:?}, read {actual:?}"
    )]
    DataMismatch {
        /// Offset of the offending packet.
        offset: u64,
        /// Packet name.
        name: String,
        /// Values produced by the live run.
        expected: Vec<Value>,
        /// Values found in the trace.
        actual: Vec<Value>,
    },

    /// The trace was written by an incompatible format version.
    #[error("trace format version {found} does not match engine version {expected}")]
    VersionMismatch {
        /// Version this build writes and reads.
        expected: u32,
        /// Version found in the trace.
        found: u32,
    },

    /// A packet name longer than a one-byte length field allows.
    #[error("packet name is {len} bytes (limit 255)")]
    NameTooLong {
        /// Length of the rejected name.
        len: usize,
    },

    /// A packet payload longer than a one-byte length field allows.
    #[error("payload of packet '{name}' is {len} bytes (limit 255)")]
    PayloadTooLong {
        /// Packet name.
        name: String,
        /// Length of the rejected payload.
        len: usize,
    },

    /// Values handed to the encoder do not match the format descriptor.
    #[error("packet '{name}': values do not match format: {detail}")]
    PayloadEncode {
        /// Packet name.
        name: String,
        /// Which value was wrong.
        detail: String,
    },

    /// An integer draw was requested with bounds the trace cannot carry or
    /// with an empty range.
    #[error("integer range [{low}, {high}] is invalid")]
    OutOfRange {
        /// Requested lower bound.
        low: i64,
        /// Requested upper bound.
        high: i64,
    },

    /// The operation is not valid in the session's current mode.
    #[error("cannot {operation} while {mode}")]
    InvalidMode {
        /// What was attempted.
        operation: &'static str,
        /// The session mode at the time.
        mode: &'static str,
    },

    /// The trace configuration failed validation.
    #[error("invalid trace configuration: {0}")]
    Config(#[from] ConfigError),
}

impl TraceError {
    /// `true` for the ordinary end-of-replay condition.
    pub fn is_end_of_trace(&self) -> bool {
        matches!(self, Self::EndOfTrace { .. })
    }

    /// Stream offset the error refers to, when it refers to a packet.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::EndOfTrace { offset }
            | Self::Truncated { offset, .. }
            | Self::NameMismatch { offset, .. }
            | Self::PayloadDecode { offset, .. }
            | Self::DataMismatch { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}
