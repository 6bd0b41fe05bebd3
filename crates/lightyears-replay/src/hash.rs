//! Running digest over the packets of a trace.
//!
//! Uses FNV-1a: fast and deterministic, not cryptographic. Writer and
//! reader feed the same bytes in the same order, so a replay that reached
//! the end of a trace holds the same digest the recording finished with.

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

/// Feed a single byte into an FNV-1a hash state.
#[inline]
fn fnv1a_byte(hash: u64, byte: u8) -> u64 {
    (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
}

#[inline]
fn fnv1a_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

/// Incremental FNV-1a digest of a packet sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceDigest {
    state: u64,
    packets: u64,
}

impl TraceDigest {
    /// An empty digest.
    pub const fn new() -> Self {
        Self {
            state: FNV_OFFSET,
            packets: 0,
        }
    }

    /// Fold one packet in, header bytes included.
    ///
    /// Lengths are folded before contents so that moving bytes between
    /// name and payload changes the digest.
    pub fn update(&mut self, name: &[u8], payload: &[u8]) {
        let mut h = fnv1a_byte(self.state, name.len() as u8);
        h = fnv1a_byte(h, payload.len() as u8);
        h = fnv1a_bytes(h, name);
        self.state = fnv1a_bytes(h, payload);
        self.packets += 1;
    }

    /// Current digest value.
    pub const fn value(&self) -> u64 {
        self.state
    }

    /// Number of packets folded in so far.
    pub const fn packets(&self) -> u64 {
        self.packets
    }
}

impl Default for TraceDigest {
    fn default() -> Self {
        Self::new()
    }
}
