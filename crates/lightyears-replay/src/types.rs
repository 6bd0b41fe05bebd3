//! Packet vocabulary: scalar formats, decoded values, and the fixed set of
//! packet kinds a trace may contain.

/// Fixed-width little-endian scalar a payload is built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scalar {
    /// Unsigned byte.
    U8,
    /// Signed 32-bit integer.
    I32,
    /// Unsigned 32-bit integer.
    U32,
    /// 64-bit IEEE float.
    F64,
}

impl Scalar {
    /// Encoded width in bytes.
    pub const fn width(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::I32 | Self::U32 => 4,
            Self::F64 => 8,
        }
    }
}

/// Total encoded width of a format descriptor.
pub fn format_width(format: &[Scalar]) -> usize {
    format.iter().map(|s| s.width()).sum()
}

/// One decoded (or to-be-encoded) payload value.
///
/// Equality is numeric equality per variant, so `F64` follows IEEE
/// comparison: `NaN` never equals anything, `-0.0 == 0.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    /// Unsigned byte.
    U8(u8),
    /// Signed 32-bit integer.
    I32(i32),
    /// Unsigned 32-bit integer.
    U32(u32),
    /// 64-bit float.
    F64(f64),
}

impl Value {
    /// The float, if this is an `F64`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::F64(v) => Some(v),
            _ => None,
        }
    }
}

/// A raw packet as read from a trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    /// Packet name (1-byte length prefixed on the wire).
    pub name: String,
    /// Undecoded payload bytes.
    pub payload: Vec<u8>,
    /// Uncompressed stream offset of the packet's first header byte.
    pub offset: u64,
}

impl Packet {
    /// Encoded size including the two header bytes.
    pub fn encoded_len(&self) -> usize {
        2 + self.name.len() + self.payload.len()
    }
}

/// A packet name paired with its payload format.
///
/// The same `PacketKind` is used at encode and at decode time; the decoder
/// never infers structure from the data it reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PacketKind {
    /// Name written into the packet header.
    pub name: &'static str,
    /// Payload layout.
    pub format: &'static [Scalar],
}

use Scalar::{F64, I32, U32, U8};

/// Trace header: format version.
pub const GAME: PacketKind = PacketKind { name: "GAME", format: &[U32] };
/// Trace header: generator seed and challenge id.
pub const SEED: PacketKind = PacketKind { name: "SEED", format: &[U32, U32] };
/// A uniform float draw.
pub const RANDOM: PacketKind = PacketKind { name: "RANDOM", format: &[F64] };
/// A bounded integer draw: lower bound, upper bound, result.
pub const RANDINT: PacketKind = PacketKind { name: "RANDINT", format: &[I32, I32, I32] };
/// Start of a shuffle: sequence length.
pub const SHUFFLE: PacketKind = PacketKind { name: "SHUFFLE", format: &[U32] };
/// A distance computation: dy, dx, result.
pub const HYP: PacketKind = PacketKind { name: "HYP", format: &[F64, F64, F64] };
/// Tick summary: time, supply, demand, well/node/pipe counts.
pub const TS: PacketKind = PacketKind {
    name: "TS",
    format: &[F64, F64, F64, U32, U32, U32],
};
/// One well: x, y.
pub const WELL: PacketKind = PacketKind { name: "W", format: &[U8, U8] };
/// One node: x, y, kind code, health, charge.
pub const NODE: PacketKind = PacketKind { name: "N", format: &[U8, U8, U8, I32, F64] };
/// One pipe: from x, from y, to x, to y, current.
pub const PIPE: PacketKind = PacketKind { name: "P", format: &[U8, U8, U8, U8, F64] };
/// Steam model state: neighbour count, voltage, charge, capacitance.
pub const STEAM: PacketKind = PacketKind { name: "ST", format: &[U32, F64, F64, F64] };
/// One steam neighbour: resistance, current.
pub const NEIGHBOUR: PacketKind = PacketKind { name: "n", format: &[F64, F64] };

/// Prefix of every user action packet name.
pub const ACTION_PREFIX: &str = "ACTION_";
/// Prefix, after [`ACTION_PREFIX`], of actions that carry no position.
pub const SPECIAL_PREFIX: &str = "SPECIAL_";

/// Largest name or payload a one-byte length field can describe.
pub const MAX_FIELD_LEN: usize = u8::MAX as usize;
