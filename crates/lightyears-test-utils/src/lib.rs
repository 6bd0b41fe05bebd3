//! Test utilities and mock collaborators for lightyears development.
//!
//! Provides a mock steam network implementing [`NetworkView`] and
//! recording implementations of the action playback traits
//! ([`RecordingUi`], [`RecordingGame`]).

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{ActionLog, Dispatched, RecordingGame, RecordingUi};

use indexmap::IndexMap;
use lightyears_core::{GridPos, NetworkView, NodeKind, NodeSample, PipeSample, PlaybackUi};

/// Install a `tracing` subscriber for tests.
///
/// Honours `RUST_LOG`; output goes through the test harness capture.
/// Safe to call from every test: only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Mock implementation of [`NetworkView`].
///
/// Containers are `IndexMap`s, so entities are reported in insertion
/// order. Tests insert in scrambled orders to check that nothing
/// downstream depends on that order.
#[derive(Clone, Debug, Default)]
pub struct MockNetwork {
    pub time: f64,
    pub supply: f64,
    pub demand: f64,
    wells: IndexMap<GridPos, ()>,
    nodes: IndexMap<GridPos, NodeSample>,
    pipes: IndexMap<(GridPos, GridPos), PipeSample>,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_well(&mut self, pos: GridPos) {
        self.wells.insert(pos, ());
    }

    /// Add a node, or replace the node already at `pos`.
    pub fn add_node(&mut self, pos: GridPos, kind: NodeKind, health: i32, charge: f64) {
        self.nodes.insert(
            pos,
            NodeSample {
                pos,
                kind,
                health,
                charge,
            },
        );
    }

    pub fn add_pipe(&mut self, from: GridPos, to: GridPos, current: f64) {
        self.pipes
            .insert((from, to), PipeSample { from, to, current });
    }

    /// Remove a pipe; returns whether it existed.
    pub fn remove_pipe(&mut self, from: GridPos, to: GridPos) -> bool {
        self.pipes.shift_remove(&(from, to)).is_some()
    }

    pub fn node_mut(&mut self, pos: GridPos) -> Option<&mut NodeSample> {
        self.nodes.get_mut(&pos)
    }

    pub fn pipe_mut(&mut self, from: GridPos, to: GridPos) -> Option<&mut PipeSample> {
        self.pipes.get_mut(&(from, to))
    }

    pub fn node_positions(&self) -> Vec<GridPos> {
        self.nodes.keys().copied().collect()
    }

    pub fn pipe_count(&self) -> usize {
        self.pipes.len()
    }

    /// Reverse the internal iteration order of every container.
    pub fn reverse_iteration_order(&mut self) {
        self.wells.reverse();
        self.nodes.reverse();
        self.pipes.reverse();
    }
}

impl NetworkView for MockNetwork {
    fn game_time(&self) -> f64 {
        self.time
    }

    fn steam_supply(&self) -> f64 {
        self.supply
    }

    fn steam_demand(&self) -> f64 {
        self.demand
    }

    fn wells(&self) -> Vec<GridPos> {
        self.wells.keys().copied().collect()
    }

    fn nodes(&self) -> Vec<NodeSample> {
        self.nodes.values().copied().collect()
    }

    fn pipes(&self) -> Vec<PipeSample> {
        self.pipes.values().copied().collect()
    }
}

impl PlaybackUi for MockNetwork {
    /// Toggle the pipe whose endpoints are encoded in `object_data`.
    fn playback_action(&mut self, name: &str, object_data: &[u8]) {
        if let [x1, y1, x2, y2] = *object_data {
            let (from, to) = (GridPos::new(x1, y1), GridPos::new(x2, y2));
            match name {
                "BUILD" => self.add_pipe(from, to, 0.0),
                "DESTROY" => {
                    self.remove_pipe(from, to);
                }
                _ => {}
            }
        }
    }
}
