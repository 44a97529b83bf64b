// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn system_clock_monotonic_never_decreases() {
    let clock = SystemClock;
    let t1 = clock.now_monotonic();
    std::thread::sleep(Duration::from_millis(1));
    let t2 = clock.now_monotonic();
    assert!(t2 > t1);
}

#[test]
fn system_clock_wall_is_plausible() {
    let clock = SystemClock;
    // Anything after 2020-01-01 counts as a working wall clock.
    assert!(clock.now_wall_ms() > 1_577_836_800_000);
}

#[test]
fn fake_clock_advance_moves_both_times() {
    let clock = FakeClock::new();
    let m1 = clock.now_monotonic();
    let w1 = clock.now_wall_ms();
    clock.advance(Duration::from_secs(30));
    assert!(clock.now_monotonic().duration_since(m1) >= Duration::from_secs(30));
    assert_eq!(clock.now_wall_ms(), w1 + 30_000);
}

#[test]
fn fake_clock_clones_share_time() {
    let clock = FakeClock::new();
    let other = clock.clone();
    other.advance(Duration::from_secs(5));
    assert_eq!(clock.now_wall_ms(), other.now_wall_ms());
}

#[test]
fn wall_step_leaves_monotonic_alone() {
    let clock = FakeClock::new();
    let m1 = clock.now_monotonic();
    let w1 = clock.now_wall_ms();
    clock.step_wall_ms(-60_000);
    assert_eq!(clock.now_monotonic(), m1);
    assert_eq!(clock.now_wall_ms(), w1 - 60_000);
}
