//! End-to-end record and replay example.
//!
//! Records a short run on a small grid network, replays it, then replays it
//! again with the network perturbed to show where the desync is reported.

use lightyears_bench::{grid_network, record_profile, step_network};
use lightyears_replay::{Session, TraceConfig};

fn main() {
    println!("=== lightyears record/replay example ===\n");

    let path = std::env::temp_dir().join(format!("lightyears-example-{}.trace", std::process::id()));
    let digest = record_profile(&path, TraceConfig::default(), 8, 50, 42).unwrap();
    println!("recorded 50 ticks to {} (digest {digest:#018x})", path.display());

    let mut session = Session::new();
    let challenge = session.begin_read(&path).unwrap();
    let mut net = grid_network(8, 42);
    let mut ticks = 0;
    while !session.at_end().unwrap() {
        step_network(&mut net, &mut session).unwrap();
        ticks += 1;
    }
    let replayed = session.digest().map(|d| d.value()).unwrap_or_default();
    println!("replayed {ticks} ticks (challenge {challenge}), digests match: {}", replayed == digest);
    session.close().unwrap();

    let mut session = Session::new();
    session.begin_read(&path).unwrap();
    let mut net = grid_network(8, 42);
    for tick in 1.. {
        if tick == 10 {
            net.add_well(lightyears_core::GridPos::new(7, 0));
        }
        match step_network(&mut net, &mut session) {
            Ok(()) => {}
            Err(e) => {
                println!("perturbed replay failed at tick {tick}: {e}");
                break;
            }
        }
    }

    std::fs::remove_file(&path).unwrap();
}
