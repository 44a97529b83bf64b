// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot landing watchdog.
//!
//! Armed when landing begins. Fires `on_expire` when the landing deadline
//! passes or the escalation condition (a second termination signal) turns
//! true, whichever comes first. Disarmed after a landing that finished in
//! time. The watchdog thread is deliberately not registered with the thread
//! registry: it must outlive the leak check it would otherwise trip.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_millis(10);

pub struct Watchdog {
    cancel: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Watchdog {
    /// Arm the timer. `escalate` is polled every tick; `on_expire` runs at
    /// most once.
    pub fn arm<C, F>(deadline: Duration, escalate: C, on_expire: F) -> io::Result<Self>
    where
        C: Fn() -> bool + Send + 'static,
        F: FnOnce() + Send + 'static,
    {
        let cancel = Arc::new(AtomicBool::new(false));
        let cancelled = Arc::clone(&cancel);
        let thread = std::thread::Builder::new().name("watchdog".to_string()).spawn(move || {
            let until = Instant::now() + deadline;
            loop {
                if cancelled.load(Ordering::Acquire) {
                    return;
                }
                if Instant::now() >= until || escalate() {
                    on_expire();
                    return;
                }
                std::thread::sleep(TICK);
            }
        })?;
        Ok(Self { cancel, thread: Some(thread) })
    }

    /// Stand the timer down and join its thread.
    pub fn disarm(mut self) {
        self.cancel.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
#[path = "watchdog_tests.rs"]
mod tests;
