//! lightyears: deterministic record and replay for a steam network game.
//!
//! This is the top-level facade crate that re-exports the public API of the
//! lightyears sub-crates. For most users, adding `lightyears` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use lightyears::prelude::*;
//!
//! // A network with one well and nothing else.
//! struct OneWell {
//!     time: f64,
//! }
//! impl NetworkView for OneWell {
//!     fn game_time(&self) -> f64 { self.time }
//!     fn steam_supply(&self) -> f64 { 1.0 }
//!     fn steam_demand(&self) -> f64 { 0.5 }
//!     fn wells(&self) -> Vec<GridPos> { vec![GridPos::new(3, 4)] }
//!     fn nodes(&self) -> Vec<NodeSample> { Vec::new() }
//!     fn pipes(&self) -> Vec<PipeSample> { Vec::new() }
//! }
//!
//! fn tick(net: &mut OneWell, session: &mut Session) -> Result<(), TraceError> {
//!     net.time += session.uniform_float()?;
//!     session.sample_tick(&*net)
//! }
//!
//! let path = std::env::temp_dir().join(format!("lightyears-doc-{}.trace", std::process::id()));
//!
//! // Record three ticks.
//! let mut session = Session::new();
//! session.begin_write(&path, 0).unwrap();
//! let mut net = OneWell { time: 0.0 };
//! for _ in 0..3 {
//!     tick(&mut net, &mut session).unwrap();
//! }
//! let recorded = net.time;
//! session.close().unwrap();
//!
//! // Replay them: same draws, same samples.
//! session.begin_read(&path).unwrap();
//! let mut net = OneWell { time: 0.0 };
//! while !session.at_end().unwrap() {
//!     tick(&mut net, &mut session).unwrap();
//! }
//! assert_eq!(net.time, recorded);
//! # session.close().unwrap();
//! # std::fs::remove_file(&path).unwrap();
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `lightyears-core` | Grid positions, entity samples, action targets, collaborator traits |
//! | [`replay`] | `lightyears-replay` | Packet codec, deterministic source, session controller, sampler |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core map vocabulary and collaborator traits (`lightyears-core`).
pub use lightyears_core as types;

/// Deterministic record and replay (`lightyears-replay`).
///
/// Record a run with [`replay::Session::begin_write`], replay it with
/// [`replay::Session::begin_read`] and [`replay::replay_to_end`].
pub use lightyears_replay as replay;

/// Common imports for typical lightyears usage.
///
/// ```rust
/// use lightyears::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use lightyears_core::{
        ActionTarget, GridPos, NetworkView, NodeKind, NodeSample, PipeSample, PlaybackUi,
        SpecialActions,
    };

    // Session
    pub use lightyears_replay::{
        replay_to_end, RandomSource, ReplayReport, Session, SteamNeighbour, SteamState,
        SuspendedSession,
    };

    // Configuration and errors
    pub use lightyears_replay::{Compression, TraceConfig, TraceError};
}
