//! User actions recorded between ticks and dispatched on replay.

mod common;

use common::{record, Scripted, ToySim, SEED};
use lightyears_core::{ActionTarget, GridPos, NetworkView};
use lightyears_replay::{replay_to_end, Session, TraceConfig, TraceError};
use lightyears_test_utils::{init_tracing, ActionLog, Dispatched};

fn pipe(a: (u8, u8), b: (u8, u8)) -> (GridPos, GridPos) {
    (GridPos::from(a), GridPos::from(b))
}

#[test]
fn recorded_actions_are_dispatched_in_order() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("actions.trace");
    let (from, to) = pipe((2, 3), (2, 4));
    let digest = record(
        &path,
        TraceConfig::uncompressed(),
        SEED,
        6,
        &[
            (3, Scripted::Build(from, to)),
            (3, Scripted::Special("PAUSE")),
        ],
    )
    .unwrap();

    let mut session = Session::new();
    session.begin_read(&path).unwrap();
    let log = ActionLog::new();
    let mut sim = ToySim::new();
    let report = replay_to_end(&mut session, &mut log.ui(), &mut log.game(), &mut |s: &mut Session| {
        sim.apply_dispatched(&log);
        sim.step(s)
    })
    .unwrap();

    assert_eq!(
        log.entries(),
        vec![
            Dispatched::Positional {
                name: "BUILD".into(),
                data: vec![2, 3, 2, 4],
            },
            Dispatched::Special {
                name: "PAUSE".into(),
            },
        ]
    );
    assert_eq!(report.actions, 2);
    assert_eq!(report.ticks, 6);
    assert_eq!(report.digest, digest);
    assert_eq!(sim.paused, 1);
    assert!(sim
        .net
        .pipes()
        .iter()
        .any(|p| p.endpoints() == (from, to)));
}

#[test]
fn building_then_destroying_replays_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("churn.trace");
    let (from, to) = pipe((6, 2), (1, 1));
    record(
        &path,
        TraceConfig::uncompressed(),
        SEED,
        8,
        &[
            (2, Scripted::Build(from, to)),
            (5, Scripted::Destroy(from, to)),
            (5, Scripted::Build(to, from)),
        ],
    )
    .unwrap();

    let mut session = Session::new();
    session.begin_read(&path).unwrap();
    let log = ActionLog::new();
    let mut sim = ToySim::new();
    let report = replay_to_end(&mut session, &mut log.ui(), &mut log.game(), &mut |s: &mut Session| {
        sim.apply_dispatched(&log);
        sim.step(s)
    })
    .unwrap();
    assert_eq!(report.actions, 3);
    assert_eq!(sim.net.pipe_count(), 4);
}

#[test]
fn ignoring_a_replayed_action_desyncs_the_next_tick() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ignored.trace");
    let (from, to) = pipe((2, 3), (2, 4));
    record(
        &path,
        TraceConfig::uncompressed(),
        SEED,
        4,
        &[(2, Scripted::Build(from, to))],
    )
    .unwrap();

    let mut session = Session::new();
    session.begin_read(&path).unwrap();
    let log = ActionLog::new();
    let mut sim = ToySim::new();
    // The step never applies dispatched actions.
    let err = replay_to_end(&mut session, &mut log.ui(), &mut log.game(), &mut |s: &mut Session| {
        sim.step(s)
    })
    .unwrap_err();
    assert!(
        matches!(err, TraceError::DataMismatch { ref name, .. } if name == "TS"),
        "{err:?}"
    );
    assert_eq!(sim.ticks, 2);
}

#[test]
fn actions_are_verified_when_re_recorded_during_replay() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("verify.trace");

    let mut rec = Session::with_config(TraceConfig::uncompressed());
    rec.begin_write_seeded(&path, 1, SEED).unwrap();
    let target = ActionTarget::Building {
        pos: GridPos::new(4, 4),
    };
    rec.record_action("UPGRADE", &[target]).unwrap();
    rec.record_special_action("PAUSE").unwrap();
    rec.close().unwrap();

    let mut rep = Session::new();
    rep.begin_read(&path).unwrap();
    let other = ActionTarget::Building {
        pos: GridPos::new(4, 5),
    };
    let err = rep.record_action("UPGRADE", &[other]).unwrap_err();
    assert!(
        matches!(err, TraceError::DataMismatch { ref name, .. } if name == "ACTION_UPGRADE"),
        "{err:?}"
    );
    rep.record_special_action("PAUSE").unwrap();
    assert!(rep.at_end().unwrap());
}

#[test]
fn draining_stops_at_the_first_non_action() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drain.trace");

    let mut rec = Session::with_config(TraceConfig::uncompressed());
    rec.begin_write_seeded(&path, 1, SEED).unwrap();
    rec.record_special_action("PAUSE").unwrap();
    rec.sample_tick(&lightyears_test_utils::MockNetwork::new())
        .unwrap();
    rec.record_special_action("RESUME").unwrap();
    rec.close().unwrap();

    let mut rep = Session::new();
    rep.begin_read(&path).unwrap();
    let log = ActionLog::new();
    assert_eq!(
        rep.drain_pending_actions(&mut log.ui(), &mut log.game())
            .unwrap(),
        1
    );
    assert_eq!(
        rep.drain_pending_actions(&mut log.ui(), &mut log.game())
            .unwrap(),
        0
    );
    rep.sample_tick(&lightyears_test_utils::MockNetwork::new())
        .unwrap();
    assert_eq!(
        rep.drain_pending_actions(&mut log.ui(), &mut log.game())
            .unwrap(),
        1
    );
    assert!(rep.at_end().unwrap());
    assert_eq!(log.len(), 2);
}

#[test]
fn draining_outside_replay_does_nothing() {
    let log = ActionLog::new();
    let mut session = Session::new();
    assert_eq!(
        session
            .drain_pending_actions(&mut log.ui(), &mut log.game())
            .unwrap(),
        0
    );
    assert!(log.is_empty());
}
