//! A toy steam simulation shared by the integration tests.
//!
//! Each tick draws randomness through the session, mutates a
//! [`MockNetwork`], then samples the steam model and the whole network.

#![allow(dead_code)]

use std::path::Path;

use lightyears_core::{ActionTarget, GridPos, NodeKind, PlaybackUi};
use lightyears_replay::{
    RandomSource, Session, SteamNeighbour, SteamState, TraceConfig, TraceError,
};
use lightyears_test_utils::{ActionLog, Dispatched, MockNetwork};

pub const SEED: u32 = 0x5eed;
pub const CHALLENGE: u32 = 7;

/// A user action injected before a given tick while recording.
#[derive(Clone, Copy, Debug)]
pub enum Scripted {
    Build(GridPos, GridPos),
    Destroy(GridPos, GridPos),
    Special(&'static str),
}

pub struct ToySim {
    pub net: MockNetwork,
    pub ticks: u64,
    /// Tick at which the replayed run diverges from the recorded one.
    pub desync_at: Option<u64>,
    pub paused: u32,
    applied: usize,
}

impl ToySim {
    pub fn new() -> Self {
        let mut net = MockNetwork::new();
        // Deliberately scrambled insertion order.
        net.add_well(GridPos::new(6, 2));
        net.add_well(GridPos::new(1, 1));
        net.add_node(GridPos::new(6, 2), NodeKind::WellNode, 100, 0.0);
        net.add_node(GridPos::new(4, 4), NodeKind::Junction, 80, 0.0);
        net.add_node(GridPos::new(1, 1), NodeKind::WellNode, 100, 0.0);
        net.add_node(GridPos::new(2, 3), NodeKind::Junction, 60, 0.0);
        net.add_pipe(GridPos::new(4, 4), GridPos::new(6, 2), 0.5);
        net.add_pipe(GridPos::new(1, 1), GridPos::new(2, 3), 0.25);
        net.add_pipe(GridPos::new(2, 3), GridPos::new(4, 4), 0.0);
        Self {
            net,
            ticks: 0,
            desync_at: None,
            paused: 0,
            applied: 0,
        }
    }

    /// Advance one tick.
    pub fn step(&mut self, session: &mut Session) -> Result<(), TraceError> {
        self.ticks += 1;

        let jitter = session.uniform_float()?;

        let mut order = self.net.node_positions();
        order.sort_unstable();
        session.shuffle(&mut order)?;
        let pick = session.uniform_int(0, order.len() as i64 - 1)?;
        let target = order[pick as usize];

        let (a, b) = (order[0], order[1]);
        let dist = session.distance(
            f64::from(b.y) - f64::from(a.y),
            f64::from(b.x) - f64::from(a.x),
        )?;

        if let Some(node) = self.net.node_mut(target) {
            node.charge += jitter * dist;
            node.health -= 1;
        }
        if let Some(pipe) = self.net.pipe_mut(GridPos::new(2, 3), GridPos::new(4, 4)) {
            pipe.current = jitter - 0.5;
        }
        self.net.time += 0.25;
        self.net.supply = 10.0 + jitter;
        self.net.demand = 8.0 + dist / 10.0;

        session.sample_steam(
            SteamState {
                voltage: self.net.supply,
                charge: jitter,
                capacitance: 1.0,
            },
            &[
                SteamNeighbour {
                    resistance: dist,
                    current: jitter,
                },
                SteamNeighbour {
                    resistance: 1.0,
                    current: -jitter,
                },
            ],
        )?;

        if self.desync_at == Some(self.ticks) {
            self.net.supply += 1.0;
        }
        session.sample_tick(&self.net)
    }

    /// Apply a scripted action while recording, writing it to the trace.
    pub fn perform(&mut self, session: &mut Session, action: Scripted) -> Result<(), TraceError> {
        match action {
            Scripted::Build(from, to) => {
                session.record_action("BUILD", &[ActionTarget::Pipe { from, to }])?;
                self.net.add_pipe(from, to, 0.0);
            }
            Scripted::Destroy(from, to) => {
                session.record_action("DESTROY", &[ActionTarget::Pipe { from, to }])?;
                self.net.remove_pipe(from, to);
            }
            Scripted::Special(name) => {
                session.record_special_action(name)?;
                self.paused += 1;
            }
        }
        Ok(())
    }

    /// Apply actions the replay dispatched into `log` since the last call.
    pub fn apply_dispatched(&mut self, log: &ActionLog) {
        let entries = log.entries();
        for entry in &entries[self.applied..] {
            match entry {
                Dispatched::Positional { name, data } => self.net.playback_action(name, data),
                Dispatched::Special { .. } => self.paused += 1,
            }
        }
        self.applied = entries.len();
    }
}

/// Record `ticks` ticks to `path`, injecting `script` actions before the
/// tick they are keyed by. Returns the recorded digest.
pub fn record(
    path: &Path,
    config: TraceConfig,
    seed: u32,
    ticks: u64,
    script: &[(u64, Scripted)],
) -> Result<u64, TraceError> {
    let mut session = Session::with_config(config);
    session.begin_write_seeded(path, CHALLENGE, seed)?;
    let mut sim = ToySim::new();
    for tick in 1..=ticks {
        for &(_, action) in script.iter().filter(|(t, _)| *t == tick) {
            sim.perform(&mut session, action)?;
        }
        sim.step(&mut session)?;
    }
    let digest = session.digest().map(|d| d.value()).unwrap_or_default();
    session.close()?;
    Ok(digest)
}
