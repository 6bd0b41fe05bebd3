//! Deterministic record-and-replay for lightyears sessions.
//!
//! Every nondeterministic input of a game (random draws, shuffles, user
//! actions) is captured to a trace file while playing, so the session can
//! later be replayed bit-for-bit. During replay the engine checks, at every
//! sample point, that the simulation reproduces the recorded state, and
//! fails with a [`TraceError`] the moment it does not.
//!
//! # Architecture
//!
//! - [`codec`] encodes and decodes name-tagged, length-prefixed packets
//! - [`TraceWriter`] / [`TraceReader`] stream packets to and from a sink
//! - [`DeterministicSource`] is the seeded generator behind [`RandomSource`]
//! - [`Session`] owns the record/replay state machine and the generator
//! - [`Session::sample_tick`] and friends snapshot network state and input
//! - [`replay_to_end`] drives a simulation through a whole trace
//!
//! # Format
//!
//! ```text
//! [GAME <u32 version>] [SEED <u32 seed, u32 challenge>] [packet]*
//! packet := len(name):u8 len(payload):u8 name payload
//! ```
//!
//! The packet stream is optionally wrapped in a single zstd stream.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod config;
pub mod driver;
pub mod error;
pub mod hash;
pub mod reader;
pub mod rng;
pub mod sampler;
pub mod session;
pub mod types;
pub mod writer;

pub use config::{Compression, ConfigError, TraceConfig};
pub use driver::{replay_to_end, ReplayReport};
pub use error::TraceError;
pub use hash::TraceDigest;
pub use reader::{PacketIter, TraceReader, TraceSource};
pub use rng::{DeterministicSource, RandomSource};
pub use sampler::{SteamNeighbour, SteamState};
pub use session::{Session, SuspendedSession};
pub use types::{Packet, PacketKind, Scalar, Value};
pub use writer::{TraceSink, TraceWriter};

/// Trace format version, carried by the `GAME` packet.
///
/// Readers accept exactly this value; there is no compatibility range.
pub const FORMAT_VERSION: u32 = 20210307;
