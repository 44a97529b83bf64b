// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The OS signal surface.
//!
//! A dedicated monitor thread owns the signal-hook iterator and translates
//! raw signals into events: the first SIGTERM/SIGINT begins landing, every
//! further one bumps a counter the watchdog polls for escalation, and
//! SIGHUP asks the bus to reopen its file sinks.
//!
//! The monitor thread is process infrastructure, not a subsystem worker: it
//! stays up through landing (the second-signal counter must keep moving)
//! and is joined explicitly by `run` after the landing review.

use crossbeam_channel::{unbounded, Receiver};
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignalError {
    #[error("failed to install signal handlers: {0}")]
    Install(#[source] std::io::Error),

    #[error("failed to spawn signal monitor: {0}")]
    Spawn(#[source] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    /// SIGTERM or SIGINT: begin (or, repeated, escalate) landing.
    Terminate,
    /// SIGHUP: reopen file sinks.
    Rotate,
}

pub struct SignalMonitor {
    handle: Handle,
    thread: Option<JoinHandle<()>>,
    events: Receiver<SignalEvent>,
    term_count: Arc<AtomicU32>,
}

impl SignalMonitor {
    pub fn start() -> Result<Self, SignalError> {
        let mut signals =
            Signals::new([SIGTERM, SIGINT, SIGHUP]).map_err(SignalError::Install)?;
        let handle = signals.handle();
        let (tx, events) = unbounded();
        let term_count = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&term_count);
        let thread = std::thread::Builder::new()
            .name("signal-monitor".to_string())
            .spawn(move || {
                for signal in signals.forever() {
                    match signal {
                        SIGTERM | SIGINT => {
                            counter.fetch_add(1, Ordering::AcqRel);
                            let _ = tx.send(SignalEvent::Terminate);
                        }
                        SIGHUP => {
                            let _ = tx.send(SignalEvent::Rotate);
                        }
                        _ => {}
                    }
                }
            })
            .map_err(SignalError::Spawn)?;

        Ok(Self { handle, thread: Some(thread), events, term_count })
    }

    pub fn events(&self) -> &Receiver<SignalEvent> {
        &self.events
    }

    /// Termination signals seen so far; the watchdog escalates at two.
    pub fn term_counter(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.term_count)
    }

    /// Close the iterator and join the monitor thread.
    pub fn stop(mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
#[path = "signals_tests.rs"]
mod tests;
