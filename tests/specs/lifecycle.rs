// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launch/landing lifecycle specs.
//!
//! The four-subsystem chain `webserver -> net -> threads -> log` is the
//! canonical scenario: start order must be the topo order and stop order
//! its exact reverse.

use crate::prelude::*;

fn chain(world: &World) {
    world.add(world.stub("log"));
    world.add(world.stub("threads").depends_on(&["log"]).workers(1));
    world.add(world.stub("net").depends_on(&["threads"]).workers(1));
    world.add(world.stub("webserver").depends_on(&["net"]).workers(2));
}

#[test]
fn happy_path_round_trip() {
    let world = World::new();
    chain(&world);

    let launch = world.launch();
    assert_eq!(world.journal.of_kind("init"), vec!["log", "threads", "net", "webserver"]);
    assert_eq!(launch.running(), 4);
    for name in ["log", "threads", "net", "webserver"] {
        assert_eq!(world.registry.state(name), Some(SubState::Running));
    }

    let landing = world.land();
    assert_eq!(world.journal.of_kind("stop"), vec!["webserver", "net", "threads", "log"]);
    for name in ["log", "threads", "net", "webserver"] {
        assert_eq!(world.registry.state(name), Some(SubState::Inactive));
    }
    assert_eq!(landing.final_thread_count, 1);
    assert_eq!(landing.exit, ExitStatus::Clean);
    assert_eq!(landing.exit.code(), 0);
}

#[test]
fn missing_dependency_cascades_to_dependents() {
    let world = World::new();
    world.add(world.stub("log"));
    world.add(world.stub("threads").resources_no_go("scratch dir probe failed"));
    world.add(world.stub("net").depends_on(&["threads"]));
    world.add(world.stub("webserver").depends_on(&["net"]));

    let launch = world.launch();
    assert_eq!(launch.running(), 1);
    assert_eq!(launch.inactive(), 3);
    assert_eq!(world.registry.state("log"), Some(SubState::Running));
    assert_eq!(world.registry.state("threads"), Some(SubState::Inactive));
    assert_eq!(world.registry.state("net"), Some(SubState::Inactive));
    assert_eq!(world.registry.state("webserver"), Some(SubState::Inactive));

    // net's report names the missing dependency verbatim.
    world.ctx.bus.flush(Duration::from_secs(2));
    assert!(world
        .out
        .lines()
        .iter()
        .any(|l| l.contains("net") && l.contains("No-Go: deps: dependency 'threads' not Running")));

    // Only log ever inited, and only log stops.
    let landing = world.land();
    assert_eq!(world.journal.of_kind("init"), vec!["log"]);
    assert_eq!(world.journal.of_kind("stop"), vec!["log"]);
    assert_eq!(landing.exit, ExitStatus::Clean);
}

#[test]
fn init_failure_leaves_others_running_and_exits_one() {
    let world = World::new();
    world.add(world.stub("log"));
    world.add(world.stub("net").depends_on(&["log"]));
    world.add(
        world
            .stub("webserver")
            .depends_on(&["net"])
            .init(InitBehavior::Fail("bind: address already in use")),
    );

    let launch = world.launch();
    assert_eq!(launch.running(), 2);
    assert_eq!(launch.errored(), 1);
    assert_eq!(world.registry.state("webserver"), Some(SubState::Error));
    assert_eq!(world.registry.state("net"), Some(SubState::Running));

    let landing = world.land();
    // webserver's stop hook is never invoked after a failed init.
    assert_eq!(world.journal.of_kind("stop"), vec!["net", "log"]);
    assert_eq!(landing.exit, ExitStatus::SubsystemErrors);
    assert_eq!(landing.exit.code(), 1);
}

#[test]
fn stop_timeout_is_contained_and_landing_continues() {
    let world = World::new();
    world.add(world.stub("net"));
    world.add(
        world
            .stub("webserver")
            .depends_on(&["net"])
            .stop(StopBehavior::HangMs(400)),
    );
    world.launch();

    let landing = world.land_with(LandingOptions {
        stop_deadline: Duration::from_millis(60),
        flush_deadline: Duration::from_secs(2),
    });

    assert_eq!(world.registry.state("webserver"), Some(SubState::Error));
    assert_eq!(world.registry.state("net"), Some(SubState::Inactive));
    assert_eq!(world.journal.of_kind("stop"), vec!["webserver", "net"]);
    assert_eq!(landing.exit, ExitStatus::SubsystemErrors);

    let outcome = landing.outcomes.iter().find(|o| o.name == "webserver").expect("outcome");
    assert!(!outcome.clean);
    assert!(outcome.survivors.iter().any(|label| label == "webserver.stop"));

    // Let the hung stop helper run out before the test binary exits.
    std::thread::sleep(Duration::from_millis(450));
}
