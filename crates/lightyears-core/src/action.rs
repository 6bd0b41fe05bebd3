//! Targets of user actions and their byte encoding.

use smallvec::SmallVec;

use crate::id::GridPos;

/// Raw object bytes attached to an action packet.
///
/// Most actions touch one or two objects, so eight inline bytes cover
/// the common case without allocating.
pub type ObjectData = SmallVec<[u8; 8]>;

/// A map object a user action refers to.
///
/// Every variant encodes to the positions of the object, never to an
/// identity: the replayed run resolves positions back to its own objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionTarget {
    /// A pipe, identified by both endpoint positions (4 bytes).
    Pipe {
        /// First endpoint.
        from: GridPos,
        /// Second endpoint.
        to: GridPos,
    },
    /// Any other building, identified by where it stands (2 bytes).
    Building {
        /// Building position.
        pos: GridPos,
    },
}

impl ActionTarget {
    /// Number of bytes [`encode`](Self::encode) appends.
    pub const fn encoded_len(&self) -> usize {
        match self {
            Self::Pipe { .. } => 4,
            Self::Building { .. } => 2,
        }
    }

    /// Append this target's position bytes to `out`.
    pub fn encode(&self, out: &mut ObjectData) {
        match *self {
            Self::Pipe { from, to } => {
                out.extend_from_slice(&[from.x, from.y, to.x, to.y]);
            }
            Self::Building { pos } => {
                out.extend_from_slice(&[pos.x, pos.y]);
            }
        }
    }

    /// Encode a list of targets back to back.
    pub fn encode_all(targets: &[ActionTarget]) -> ObjectData {
        let mut out = ObjectData::with_capacity(targets.iter().map(Self::encoded_len).sum());
        for t in targets {
            t.encode(&mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn pipe_encodes_both_endpoints() {
        let t = ActionTarget::Pipe {
            from: GridPos::new(2, 3),
            to: GridPos::new(2, 4),
        };
        let data = ActionTarget::encode_all(&[t]);
        assert_eq!(data.as_slice(), &[2, 3, 2, 4]);
    }

    #[test]
    fn building_encodes_position() {
        let t = ActionTarget::Building {
            pos: GridPos::new(7, 1),
        };
        let data = ActionTarget::encode_all(&[t]);
        assert_eq!(data.as_slice(), &[7, 1]);
    }

    #[test]
    fn no_targets_encode_empty() {
        assert!(ActionTarget::encode_all(&[]).is_empty());
    }

    fn arb_target() -> impl Strategy<Value = ActionTarget> {
        prop_oneof![
            (any::<u8>(), any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(a, b, c, d)| {
                ActionTarget::Pipe {
                    from: GridPos::new(a, b),
                    to: GridPos::new(c, d),
                }
            }),
            (any::<u8>(), any::<u8>()).prop_map(|(x, y)| ActionTarget::Building {
                pos: GridPos::new(x, y)
            }),
        ]
    }

    proptest! {
        #[test]
        fn encoded_length_is_sum_of_parts(targets in prop::collection::vec(arb_target(), 0..8)) {
            let data = ActionTarget::encode_all(&targets);
            let expected: usize = targets.iter().map(ActionTarget::encoded_len).sum();
            prop_assert_eq!(data.len(), expected);
        }
    }
}
