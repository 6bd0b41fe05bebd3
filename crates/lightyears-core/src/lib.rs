//! Core types and traits for the lightyears steam network.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! map-level vocabulary shared by the replay engine and its collaborators:
//! grid positions, per-entity samples, action targets, and the read-only
//! view the replay engine takes of a running simulation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod action;
pub mod id;
pub mod traits;

pub use action::{ActionTarget, ObjectData};
pub use id::{GridPos, NodeKind, NodeSample, PipeSample};
pub use traits::{NetworkView, PlaybackUi, SpecialActions};
