// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deadline-bounded hook invocation.
//!
//! `init` and `stop` run on a helper thread so the sequencer can walk away
//! at the deadline. A helper that overruns is handed to the subsystem's
//! thread group, where it shows up as a surviving thread instead of wedging
//! the sequencer. Panics inside a hook are caught here and surfaced as an
//! outcome, never propagated.

use crate::context::SubsystemCtx;
use crate::subsystem::{Subsystem, SubsystemError};
use crossbeam_channel::bounded;
use hy_threads::GroupHandle;
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug)]
pub enum HookOutcome {
    Completed(Result<(), SubsystemError>),
    Panicked(String),
    DeadlineExceeded,
}

type HookCell = Arc<Mutex<Box<dyn Subsystem>>>;

/// Run `init` with a deadline.
pub fn run_init(
    hook: HookCell,
    ctx: SubsystemCtx,
    group: &GroupHandle,
    label: &str,
    deadline: Duration,
) -> HookOutcome {
    run_hook(group, label, deadline, move || hook.lock().init(&ctx))
}

/// Run `stop` with a deadline.
pub fn run_stop(hook: HookCell, group: &GroupHandle, label: &str, deadline: Duration) -> HookOutcome {
    run_hook(group, label, deadline, move || hook.lock().stop())
}

fn run_hook<F>(group: &GroupHandle, label: &str, deadline: Duration, f: F) -> HookOutcome
where
    F: FnOnce() -> Result<(), SubsystemError> + Send + 'static,
{
    let (tx, rx) = bounded(1);
    let spawned = std::thread::Builder::new().name(label.to_string()).spawn(move || {
        let outcome = match catch_unwind(AssertUnwindSafe(f)) {
            Ok(result) => HookOutcome::Completed(result),
            Err(payload) => HookOutcome::Panicked(panic_text(payload)),
        };
        let _ = tx.send(outcome);
    });
    let handle = match spawned {
        Ok(handle) => handle,
        Err(err) => {
            return HookOutcome::Completed(Err(SubsystemError::Io(err)));
        }
    };
    match rx.recv_timeout(deadline) {
        Ok(outcome) => {
            // The helper sent its outcome and is exiting; reap it here so it
            // never shows up in the subsystem's thread count.
            let _ = handle.join();
            outcome
        }
        Err(_) => {
            // Still running past its deadline: hand the thread to the
            // subsystem's group, where the landing leak check will name it.
            group.register(handle, label);
            HookOutcome::DeadlineExceeded
        }
    }
}

fn panic_text(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "opaque panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "hooks_tests.rs"]
mod tests;
