//! Consistency sampling: snapshots of network state and user input,
//! recorded or verified through [`Session::read_and_write`].
//!
//! Entities are always emitted in a total order that does not depend on
//! the simulation's containers: wells and nodes by position, pipes by
//! `(from, to)` endpoint pair. Any entity kind added to the samples must
//! come with such an order before it can be emitted.

use lightyears_core::{ActionTarget, NetworkView, PlaybackUi, SpecialActions};
use tracing::debug;

use crate::error::TraceError;
use crate::session::Session;
use crate::types::{
    Scalar, Value, ACTION_PREFIX, NEIGHBOUR, NODE, PIPE, SPECIAL_PREFIX, STEAM, TS, WELL,
};

/// One link of a steam model to a neighbouring model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SteamNeighbour {
    /// Resistance of the link.
    pub resistance: f64,
    /// Current through the link.
    pub current: f64,
}

/// Electrical state of one steam model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SteamState {
    /// Voltage (steam pressure).
    pub voltage: f64,
    /// Stored charge.
    pub charge: f64,
    /// Capacitance.
    pub capacitance: f64,
}

fn count(name: &str, n: usize) -> Result<Value, TraceError> {
    u32::try_from(n)
        .map(Value::U32)
        .map_err(|_| TraceError::PayloadEncode {
            name: name.to_string(),
            detail: format!("count {n} exceeds u32"),
        })
}

impl Session {
    /// Sample the network once per tick.
    ///
    /// Emits a `TS` summary (time, supply, demand, entity counts) followed
    /// by one `W` per well, one `N` per node and one `P` per pipe, each
    /// group sorted. While replaying, the first difference from the trace
    /// fails with [`TraceError::DataMismatch`] naming the packet.
    pub fn sample_tick(&mut self, net: &dyn NetworkView) -> Result<(), TraceError> {
        let mut wells = net.wells();
        let mut nodes = net.nodes();
        let mut pipes = net.pipes();
        wells.sort_unstable();
        nodes.sort_by_key(|n| n.pos);
        pipes.sort_by_key(|p| p.endpoints());

        let time = net.game_time();
        self.read_and_write(
            TS.name,
            TS.format,
            &[
                Value::F64(time),
                Value::F64(net.steam_supply()),
                Value::F64(net.steam_demand()),
                count(TS.name, wells.len())?,
                count(TS.name, nodes.len())?,
                count(TS.name, pipes.len())?,
            ],
        )?;

        for w in &wells {
            self.read_and_write(WELL.name, WELL.format, &[Value::U8(w.x), Value::U8(w.y)])?;
        }

        for n in &nodes {
            self.read_and_write(
                NODE.name,
                NODE.format,
                &[
                    Value::U8(n.pos.x),
                    Value::U8(n.pos.y),
                    Value::U8(n.kind.code()),
                    Value::I32(n.health),
                    Value::F64(n.charge),
                ],
            )?;
        }

        for p in &pipes {
            self.read_and_write(
                PIPE.name,
                PIPE.format,
                &[
                    Value::U8(p.from.x),
                    Value::U8(p.from.y),
                    Value::U8(p.to.x),
                    Value::U8(p.to.y),
                    Value::F64(p.current),
                ],
            )?;
        }

        debug!(
            time,
            wells = wells.len(),
            nodes = nodes.len(),
            pipes = pipes.len(),
            mode = self.mode_name(),
            "tick sampled"
        );
        Ok(())
    }

    /// Sample one steam model after it has been solved.
    ///
    /// Emits `ST` followed by one `n` per neighbour, in the order given;
    /// the solver's neighbour order is itself deterministic.
    pub fn sample_steam(
        &mut self,
        state: SteamState,
        neighbours: &[SteamNeighbour],
    ) -> Result<(), TraceError> {
        self.read_and_write(
            STEAM.name,
            STEAM.format,
            &[
                count(STEAM.name, neighbours.len())?,
                Value::F64(state.voltage),
                Value::F64(state.charge),
                Value::F64(state.capacitance),
            ],
        )?;
        for n in neighbours {
            self.read_and_write(
                NEIGHBOUR.name,
                NEIGHBOUR.format,
                &[Value::F64(n.resistance), Value::F64(n.current)],
            )?;
        }
        Ok(())
    }

    /// Record a positional user action such as building or removing a pipe.
    ///
    /// The packet is named `ACTION_<name>` and carries the position bytes
    /// of every target. While replaying it is verified like any other
    /// sample, so a playback UI must apply replayed actions without
    /// recording them again.
    pub fn record_action(&mut self, name: &str, targets: &[ActionTarget]) -> Result<(), TraceError> {
        let data = ActionTarget::encode_all(targets);
        let format = vec![Scalar::U8; data.len()];
        let values: Vec<Value> = data.iter().map(|&b| Value::U8(b)).collect();
        let packet = format!("{ACTION_PREFIX}{name}");
        debug!(action = %packet, bytes = data.len(), "action");
        self.read_and_write(&packet, &format, &values)
    }

    /// Record an action that has no map position, e.g. pausing.
    ///
    /// Named `ACTION_SPECIAL_<name>` with an empty payload.
    pub fn record_special_action(&mut self, name: &str) -> Result<(), TraceError> {
        let packet = format!("{ACTION_PREFIX}{SPECIAL_PREFIX}{name}");
        debug!(action = %packet, "special action");
        self.read_and_write(&packet, &[], &[])
    }

    /// Replay every user action recorded before the next tick.
    ///
    /// Consumes packets while the next one is named `ACTION_*`, stripping
    /// the prefix and dispatching `SPECIAL_*` actions to `game` and all
    /// others, with their raw position bytes, to `ui`. Stops without
    /// consuming at the first other packet or at the end of the trace.
    /// Returns the number of actions dispatched; does nothing unless
    /// replaying.
    pub fn drain_pending_actions(
        &mut self,
        ui: &mut dyn PlaybackUi,
        game: &mut dyn SpecialActions,
    ) -> Result<usize, TraceError> {
        let Some(reader) = self.reader_mut() else {
            return Ok(0);
        };

        let mut dispatched = 0;
        loop {
            match reader.peek()? {
                Some(p) if p.name.starts_with(ACTION_PREFIX) => {}
                _ => break,
            }
            let Some(packet) = reader.next_packet()? else {
                break;
            };
            let action = &packet.name[ACTION_PREFIX.len()..];
            match action.strip_prefix(SPECIAL_PREFIX) {
                Some(special) => {
                    debug!(action = special, offset = packet.offset, "replaying special action");
                    game.special_action(special);
                }
                None => {
                    debug!(action, offset = packet.offset, "replaying action");
                    ui.playback_action(action, &packet.payload);
                }
            }
            dispatched += 1;
        }
        Ok(dispatched)
    }
}
