//! Benchmark profiles and utilities for the lightyears replay engine.
//!
//! - [`grid_network`]: a square steam network with deterministic contents
//! - [`step_network`]: one simulated tick drawing through a session
//! - [`record_profile`]: record a whole run to a trace file

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::Path;

use lightyears_core::{GridPos, NodeKind};
use lightyears_replay::{
    DeterministicSource, RandomSource, Session, SteamNeighbour, SteamState, TraceConfig,
    TraceError,
};
use lightyears_test_utils::MockNetwork;

/// Build a `side x side` network: a node on every cell, wells on the
/// diagonal, and pipes linking each node to its right and lower
/// neighbours.
///
/// Health and charge are drawn from `seed`, so equal arguments always give
/// equal networks.
pub fn grid_network(side: u8, seed: u32) -> MockNetwork {
    let mut rng = DeterministicSource::from_seed(seed);
    let mut net = MockNetwork::new();
    for y in 0..side {
        for x in 0..side {
            let pos = GridPos::new(x, y);
            let kind = if x == y {
                net.add_well(pos);
                NodeKind::WellNode
            } else {
                NodeKind::Junction
            };
            // Bounds are constant and valid.
            let health = rng.uniform_int(1, 100).unwrap_or(100) as i32;
            let charge = rng.uniform_float().unwrap_or_default();
            net.add_node(pos, kind, health, charge);
            if x + 1 < side {
                net.add_pipe(pos, GridPos::new(x + 1, y), 0.0);
            }
            if y + 1 < side {
                net.add_pipe(pos, GridPos::new(x, y + 1), 0.0);
            }
        }
    }
    net
}

/// Advance `net` one tick, drawing randomness through `session` and
/// sampling the result.
pub fn step_network(net: &mut MockNetwork, session: &mut Session) -> Result<(), TraceError> {
    let mut order = net.node_positions();
    order.sort_unstable();
    session.shuffle(&mut order)?;

    let mut solved = 0;
    for pos in order.iter().take(8) {
        let flow = session.uniform_float()?;
        let d = session.distance(f64::from(pos.y), f64::from(pos.x))?;
        if let Some(node) = net.node_mut(*pos) {
            node.charge += flow;
        }
        session.sample_steam(
            SteamState {
                voltage: flow * d,
                charge: flow,
                capacitance: 1.0,
            },
            &[SteamNeighbour {
                resistance: d,
                current: flow,
            }],
        )?;
        solved += 1;
    }

    net.time += 0.25;
    net.supply = f64::from(solved);
    net.demand = session.uniform_float()? * 8.0;
    session.sample_tick(&*net)
}

/// Record `ticks` ticks of a [`grid_network`] to `path`.
///
/// Returns the digest of the recorded trace.
pub fn record_profile(
    path: &Path,
    config: TraceConfig,
    side: u8,
    ticks: u32,
    seed: u32,
) -> Result<u64, TraceError> {
    let mut session = Session::with_config(config);
    session.begin_write_seeded(path, 0, seed)?;
    let mut net = grid_network(side, seed);
    for _ in 0..ticks {
        step_network(&mut net, &mut session)?;
    }
    let digest = session.digest().map(|d| d.value()).unwrap_or_default();
    session.close()?;
    Ok(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightyears_core::NetworkView;

    #[test]
    fn grid_network_is_deterministic() {
        let a = grid_network(6, 9);
        let b = grid_network(6, 9);
        assert_eq!(a.nodes(), b.nodes());
        assert_eq!(a.wells().len(), 6);
        assert_eq!(a.pipe_count(), 2 * 6 * 5);
    }

    #[test]
    fn recorded_profile_replays() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.trace");
        let digest = record_profile(&path, TraceConfig::uncompressed(), 5, 4, 3).unwrap();

        let mut session = Session::new();
        session.begin_read(&path).unwrap();
        let mut net = grid_network(5, 3);
        for _ in 0..4 {
            step_network(&mut net, &mut session).unwrap();
        }
        assert!(session.at_end().unwrap());
        assert_eq!(session.digest().unwrap().value(), digest);
    }
}
