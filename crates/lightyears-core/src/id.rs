//! Map positions and per-entity samples.

use std::fmt;

/// A cell on the game map.
///
/// Both axes fit in a byte: this is the width the trace format stores
/// positions at. Ordering is lexicographic on `(x, y)`, which is the
/// total order the consistency sampler sorts entities by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GridPos {
    /// Column.
    pub x: u8,
    /// Row.
    pub y: u8,
}

impl GridPos {
    /// Create a position from its column and row.
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(u8, u8)> for GridPos {
    fn from((x, y): (u8, u8)) -> Self {
        Self { x, y }
    }
}

/// The kind of a steam network node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A node built on top of a steam well.
    WellNode,
    /// A plain junction node.
    Junction,
}

impl NodeKind {
    /// Wire code used in `N` packets.
    pub const fn code(self) -> u8 {
        match self {
            Self::WellNode => 1,
            Self::Junction => 2,
        }
    }
}

/// Observable state of one node at sampling time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeSample {
    /// Where the node stands.
    pub pos: GridPos,
    /// Well node or junction.
    pub kind: NodeKind,
    /// Structural health.
    pub health: i32,
    /// Stored steam charge.
    pub charge: f64,
}

/// Observable state of one pipe at sampling time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipeSample {
    /// Position of the first endpoint node.
    pub from: GridPos,
    /// Position of the second endpoint node.
    pub to: GridPos,
    /// Current flowing from `from` to `to` (negative when reversed).
    pub current: f64,
}

impl PipeSample {
    /// The `(from, to)` pair pipes are ordered by.
    pub fn endpoints(&self) -> (GridPos, GridPos) {
        (self.from, self.to)
    }
}
