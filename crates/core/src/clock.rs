// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction separating monotonic deadline time from wall time.
//!
//! Deadlines throughout the sequencers use [`Clock::now_monotonic`], which is
//! never affected by wall-clock adjustments. Wall time exists only so log
//! records can carry a human-readable timestamp.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// A clock that provides both monotonic and wall time.
pub trait Clock: Send + Sync {
    /// Monotonic instant used for deadlines and elapsed-time measurement.
    fn now_monotonic(&self) -> Instant;

    /// Wall-clock milliseconds since the Unix epoch, for log timestamps only.
    fn now_wall_ms(&self) -> u64;
}

/// Real system clock.
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_monotonic(&self) -> Instant {
        Instant::now()
    }

    fn now_wall_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Controllable clock for tests.
///
/// Clones share the same underlying time, so a test can hand one clone to the
/// code under test and advance the other.
#[derive(Clone)]
pub struct FakeClock {
    inner: Arc<Mutex<FakeNow>>,
}

struct FakeNow {
    monotonic: Instant,
    wall_ms: u64,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeNow {
                monotonic: Instant::now(),
                wall_ms: 1_700_000_000_000,
            })),
        }
    }

    /// Advance both monotonic and wall time by the given duration.
    pub fn advance(&self, by: Duration) {
        let mut now = self.inner.lock();
        now.monotonic += by;
        now.wall_ms += by.as_millis() as u64;
    }

    /// Shift wall time only, simulating an NTP step; monotonic is unaffected.
    pub fn step_wall_ms(&self, by_ms: i64) {
        let mut now = self.inner.lock();
        now.wall_ms = now.wall_ms.saturating_add_signed(by_ms);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now_monotonic(&self) -> Instant {
        self.inner.lock().monotonic
    }

    fn now_wall_ms(&self) -> u64 {
        self.inner.lock().wall_ms
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
