// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn deliver_before_wait_is_observed() {
    let relay: Relay<String> = Relay::new();
    let ticket = relay.register("q-1", Duration::from_secs(1)).unwrap();
    assert!(relay.deliver("q-1", Delivery::success("row".to_string())));

    match relay.wait(ticket) {
        WaitOutcome::Delivered(delivery) => {
            assert!(delivery.ok);
            assert_eq!(delivery.payload.as_deref(), Some("row"));
        }
        other => panic!("expected delivery, got {other:?}"),
    }
    assert_eq!(relay.pending_count(), 0);
}

#[test]
fn worker_thread_wakes_the_waiter() {
    let relay: Relay<u32> = Relay::new();
    let ticket = relay.register("q-2", Duration::from_secs(5)).unwrap();

    let worker = relay.clone();
    let handle = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        worker.deliver("q-2", Delivery::success(42));
    });

    assert_eq!(relay.wait(ticket), WaitOutcome::Delivered(Delivery::success(42)));
    handle.join().unwrap();
}

#[test]
fn wait_times_out_near_the_requested_budget() {
    let relay: Relay<()> = Relay::new();
    let ticket = relay.register("q-17", Duration::from_millis(100)).unwrap();

    let started = Instant::now();
    assert_eq!(relay.wait(ticket), WaitOutcome::TimedOut);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(95), "returned too early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(500), "returned too late: {elapsed:?}");
}

#[test]
fn late_delivery_bumps_the_dropped_counter_only() {
    let relay: Relay<()> = Relay::new();
    let ticket = relay.register("q-17", Duration::from_millis(20)).unwrap();
    assert_eq!(relay.wait(ticket), WaitOutcome::TimedOut);

    assert!(!relay.deliver("q-17", Delivery::success(())));
    assert_eq!(relay.dropped_deliveries(), 1);
}

#[test]
fn delivery_to_unknown_id_is_dropped() {
    let relay: Relay<()> = Relay::new();
    assert!(!relay.deliver("nobody", Delivery::success(())));
    assert_eq!(relay.dropped_deliveries(), 1);
}

#[test]
fn second_delivery_is_dropped() {
    let relay: Relay<u32> = Relay::new();
    let ticket = relay.register("q-3", Duration::from_secs(1)).unwrap();
    assert!(relay.deliver("q-3", Delivery::success(1)));
    assert!(!relay.deliver("q-3", Delivery::success(2)));
    assert_eq!(relay.dropped_deliveries(), 1);
    assert_eq!(relay.wait(ticket), WaitOutcome::Delivered(Delivery::success(1)));
}

#[test]
fn duplicate_registration_is_rejected() {
    let relay: Relay<()> = Relay::new();
    let _ticket = relay.register("q-4", Duration::from_secs(1)).unwrap();
    assert_eq!(
        relay.register("q-4", Duration::from_secs(1)).unwrap_err(),
        RegisterError::Duplicate("q-4".to_string())
    );
}

#[test]
fn cancel_all_wakes_every_waiter() {
    let relay: Relay<()> = Relay::new();
    let mut handles = Vec::new();
    for i in 0..4 {
        let ticket = relay.register(&format!("q-{i}"), Duration::from_secs(30)).unwrap();
        let waiter = relay.clone();
        handles.push(std::thread::spawn(move || waiter.wait(ticket)));
    }

    std::thread::sleep(Duration::from_millis(20));
    relay.cancel_all();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), WaitOutcome::Cancelled);
    }
    assert_eq!(relay.register("late", Duration::from_secs(1)).unwrap_err(), RegisterError::ShuttingDown);
}

#[test]
fn issued_ids_carry_the_prefix_and_are_unique() {
    let a = Relay::<()>::issue_id("q");
    let b = Relay::<()>::issue_id("q");
    assert!(a.starts_with("q-"));
    assert_ne!(a, b);
}

#[test]
fn failure_delivery_carries_the_error_text() {
    let relay: Relay<String> = Relay::new();
    let ticket = relay.register("q-5", Duration::from_secs(1)).unwrap();
    relay.deliver("q-5", Delivery::failure("table missing"));
    match relay.wait(ticket) {
        WaitOutcome::Delivered(delivery) => {
            assert!(!delivery.ok);
            assert_eq!(delivery.error.as_deref(), Some("table missing"));
        }
        other => panic!("expected delivery, got {other:?}"),
    }
}
