// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide lifecycle flags and per-subsystem shutdown flags.
//!
//! The process flags (`starting`, `running`, `stopping`, `fatal`) are written
//! only by the sequencers; every subsystem may read them. Each subsystem
//! additionally gets its own [`ShutdownFlag`], signaled by the landing
//! sequencer before the subsystem's `stop` hook runs, so workers can observe
//! it from their own loops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Read-mostly block of process-wide state flags.
#[derive(Debug, Default)]
pub struct ProcessState {
    starting: AtomicBool,
    running: AtomicBool,
    stopping: AtomicBool,
    fatal: AtomicBool,
}

impl ProcessState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_starting(&self) {
        self.starting.store(true, Ordering::Release);
    }

    /// Marks the launch pass complete: `running` up, `starting` down.
    pub fn set_running(&self) {
        self.running.store(true, Ordering::Release);
        self.starting.store(false, Ordering::Release);
    }

    /// Marks landing begun: `stopping` up, `running` down.
    pub fn set_stopping(&self) {
        self.stopping.store(true, Ordering::Release);
        self.running.store(false, Ordering::Release);
    }

    /// Records that a fatal condition was observed. Never cleared.
    pub fn set_fatal(&self) {
        self.fatal.store(true, Ordering::Release);
    }

    pub fn is_starting(&self) -> bool {
        self.starting.load(Ordering::Acquire)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::Acquire)
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal.load(Ordering::Acquire)
    }
}

/// Per-subsystem stop signal.
///
/// Clones share the flag; a subsystem hands clones to each worker it spawns.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_signaled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
#[path = "flags_tests.rs"]
mod tests;
