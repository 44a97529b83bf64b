// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pending-result correlation specs, including the database pool that
//! consumes it.

use crate::prelude::*;
use hy_core::ShutdownFlag;
use hy_daemon::subsystems::DatabaseSubsystem;
use hy_engine::SubsystemCtx;
use hy_relay::{Delivery, Relay, WaitOutcome};

#[test]
fn q17_times_out_near_its_budget_and_late_delivery_is_counted() {
    let relay: Relay<String> = Relay::new();
    let ticket = relay.register("q-17", Duration::from_millis(500)).expect("register");

    let started = std::time::Instant::now();
    assert_eq!(relay.wait(ticket), WaitOutcome::TimedOut);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(490), "early: {elapsed:?}");
    assert!(elapsed <= Duration::from_millis(600), "late: {elapsed:?}");

    // The worker finally shows up; nobody is woken, the drop is counted.
    assert!(!relay.deliver("q-17", Delivery::success("too late".to_string())));
    assert_eq!(relay.dropped_deliveries(), 1);
}

#[test]
fn request_handler_round_trip_through_the_pool() {
    let world = World::new();
    let mut database = DatabaseSubsystem::from_config(&Config::empty());
    let pool = database.pool();

    let group = world.ctx.threads.create_group("database");
    let shutdown = ShutdownFlag::new();
    let ctx = SubsystemCtx {
        log: BusHandle::new(world.ctx.bus.clone(), "database"),
        threads: group.clone(),
        shutdown: shutdown.clone(),
        process: Arc::clone(&world.ctx.process),
    };
    use hy_engine::Subsystem;
    database.init(&ctx).expect("pool starts");

    // Simulated request handlers block on their tickets from other threads.
    let mut handlers = Vec::new();
    for i in 0..4 {
        let pool = pool.clone();
        handlers.push(std::thread::spawn(move || {
            let ticket = pool
                .submit(&format!("select * from t{i}"), Duration::from_secs(2))
                .expect("submit");
            pool.wait(ticket)
        }));
    }
    for handler in handlers {
        match handler.join().expect("handler thread") {
            WaitOutcome::Delivered(delivery) => {
                assert!(delivery.ok);
                assert_eq!(delivery.payload.as_deref(), Some("0 rows"));
            }
            other => panic!("expected delivery, got {other:?}"),
        }
    }

    shutdown.signal();
    assert!(matches!(
        group.join_all(Duration::from_secs(2)),
        hy_threads::JoinOutcome::AllJoined
    ));
}

#[test]
fn shutdown_cancels_in_flight_waiters() {
    let relay: Relay<String> = Relay::new();
    let ticket = relay.register("q-inflight", Duration::from_secs(30)).expect("register");
    let waiter_relay = relay.clone();
    let waiter = std::thread::spawn(move || waiter_relay.wait(ticket));

    std::thread::sleep(Duration::from_millis(20));
    relay.cancel_all();
    assert_eq!(waiter.join().expect("waiter"), WaitOutcome::Cancelled);

    // Post-shutdown registrations are refused outright.
    assert!(relay.register("q-late", Duration::from_secs(1)).is_err());
}
