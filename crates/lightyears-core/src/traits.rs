//! Collaborator traits: what the replay engine reads from the simulation
//! and what it calls back into when replaying user input.

use crate::id::{GridPos, NodeSample, PipeSample};

/// Read-only access to the steam network at sampling time.
///
/// Implementations may return entities in whatever order their containers
/// iterate; the consistency sampler sorts before encoding. Positions of
/// wells and of nodes must be unique within their kind.
pub trait NetworkView {
    /// Current simulation time.
    fn game_time(&self) -> f64;

    /// Aggregate steam supply at the hub.
    fn steam_supply(&self) -> f64;

    /// Aggregate steam demand at the hub.
    fn steam_demand(&self) -> f64;

    /// Positions of every steam well.
    fn wells(&self) -> Vec<GridPos>;

    /// Every node in the network.
    fn nodes(&self) -> Vec<NodeSample>;

    /// Every pipe in the network.
    fn pipes(&self) -> Vec<PipeSample>;
}

/// The user-interface side of action playback.
pub trait PlaybackUi {
    /// Apply a recorded positional action.
    ///
    /// `object_data` holds the raw position bytes exactly as recorded:
    /// four per pipe, two per other building.
    fn playback_action(&mut self, name: &str, object_data: &[u8]);
}

/// The game side of action playback: actions that carry no position.
pub trait SpecialActions {
    /// Apply a recorded special action such as pausing.
    fn special_action(&mut self, name: &str);
}
