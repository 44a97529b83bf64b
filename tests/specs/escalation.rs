// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signal and watchdog escalation specs.

use crate::prelude::*;
use hy_daemon::signals::{SignalEvent, SignalMonitor};
use hy_daemon::watchdog::Watchdog;
use std::sync::atomic::{AtomicBool, Ordering};

#[test]
fn double_signal_escalates_through_the_watchdog() {
    let monitor = SignalMonitor::start().expect("monitor starts");

    // First termination signal: landing begins.
    signal_hook::low_level::raise(signal_hook::consts::SIGTERM).expect("raise");
    assert_eq!(
        monitor.events().recv_timeout(Duration::from_secs(2)).expect("event"),
        SignalEvent::Terminate
    );

    // Landing begins; the watchdog is armed with a generous deadline but
    // watches the second-signal counter.
    let fired = Arc::new(AtomicBool::new(false));
    let fired_setter = Arc::clone(&fired);
    let term_counter = monitor.term_counter();
    let watchdog = Watchdog::arm(
        Duration::from_secs(30),
        move || term_counter.load(Ordering::Acquire) >= 2,
        move || fired_setter.store(true, Ordering::Release),
    )
    .expect("watchdog arms");

    // 200 ms later the operator mashes ctrl-c again.
    std::thread::sleep(Duration::from_millis(200));
    assert!(!fired.load(Ordering::Acquire), "watchdog fired without a second signal");
    signal_hook::low_level::raise(signal_hook::consts::SIGTERM).expect("raise");

    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    while !fired.load(Ordering::Acquire) {
        assert!(std::time::Instant::now() < deadline, "watchdog never fired");
        std::thread::sleep(Duration::from_millis(5));
    }

    drop(watchdog);
    monitor.stop();
}

#[test]
fn watchdog_fires_when_landing_overruns_the_deadline() {
    let fired = Arc::new(AtomicBool::new(false));
    let fired_setter = Arc::clone(&fired);
    let watchdog = Watchdog::arm(
        Duration::from_millis(50),
        || false,
        move || fired_setter.store(true, Ordering::Release),
    )
    .expect("watchdog arms");

    std::thread::sleep(Duration::from_millis(200));
    assert!(fired.load(Ordering::Acquire));
    drop(watchdog);
}

#[test]
fn completed_landing_disarms_the_watchdog_in_time() {
    let world = World::new();
    world.add(world.stub("net").workers(1));
    world.launch();

    let fired = Arc::new(AtomicBool::new(false));
    let fired_setter = Arc::clone(&fired);
    let watchdog = Watchdog::arm(
        Duration::from_secs(30),
        || false,
        move || fired_setter.store(true, Ordering::Release),
    )
    .expect("watchdog arms");

    let review = world.land();
    watchdog.disarm();

    assert_eq!(review.exit, ExitStatus::Clean);
    assert!(!fired.load(Ordering::Acquire));
}
