//! Replay driver: runs a simulation against a trace until it is used up.

use lightyears_core::{PlaybackUi, SpecialActions};
use tracing::info;

use crate::error::TraceError;
use crate::session::Session;

/// Outcome of a replay that reached the end of its trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayReport {
    /// Ticks stepped, including one cut short by the end of the trace.
    pub ticks: u64,
    /// User actions dispatched from the trace.
    pub actions: usize,
    /// `true` if the trace ended inside a tick rather than between ticks.
    pub ended_mid_tick: bool,
    /// Digest of every packet read.
    pub digest: u64,
}

/// Drive a replaying session to the end of its trace.
///
/// Each iteration stops if no packet remains, replays pending user
/// actions through `ui` and `game`, then calls `step` to advance the
/// simulation one tick (which is expected to draw randomness from and
/// sample into the session). An end of trace raised inside `step` counts
/// as completion; every other error is returned as-is, so the first
/// desync aborts the replay at the tick where it happened.
pub fn replay_to_end(
    session: &mut Session,
    ui: &mut dyn PlaybackUi,
    game: &mut dyn SpecialActions,
    step: &mut dyn FnMut(&mut Session) -> Result<(), TraceError>,
) -> Result<ReplayReport, TraceError> {
    if !session.is_replaying() {
        return Err(TraceError::InvalidMode {
            operation: "drive a replay",
            mode: session.mode_name(),
        });
    }

    let mut ticks = 0u64;
    let mut actions = 0usize;
    let mut ended_mid_tick = false;

    while !session.at_end()? {
        actions += session.drain_pending_actions(ui, game)?;
        if session.at_end()? {
            break;
        }
        ticks += 1;
        match step(session) {
            Ok(()) => {}
            Err(e) if e.is_end_of_trace() => {
                ended_mid_tick = true;
                break;
            }
            Err(e) => return Err(e),
        }
    }

    let digest = session.digest().map(|d| d.value()).unwrap_or_default();
    info!(ticks, actions, ended_mid_tick, "replay complete");
    Ok(ReplayReport {
        ticks,
        actions,
        ended_mid_tick,
        digest,
    })
}
