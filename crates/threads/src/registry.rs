// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thread groups, counting and deadline-bounded joining.
//!
//! The registry owns every [`std::thread::JoinHandle`] registered with it and
//! frees an entry only after a successful join. The process-wide count starts
//! at 1 for the main thread; a clean shutdown must bring it back to 1.

use parking_lot::Mutex;
use smol_str::SmolStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{JoinHandle, ThreadId};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThreadError {
    #[error("failed to spawn thread '{label}': {source}")]
    Spawn {
        label: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result of joining a group against a deadline.
#[derive(Debug, PartialEq, Eq)]
pub enum JoinOutcome {
    AllJoined,
    /// The deadline passed with these thread labels still running.
    Timeout { remaining: Vec<String> },
}

struct Entry {
    label: SmolStr,
    os_id: ThreadId,
    handle: JoinHandle<()>,
    #[allow(dead_code)]
    started_at: Instant,
}

struct Group {
    name: SmolStr,
    entries: Vec<Entry>,
}

struct Inner {
    groups: Mutex<Vec<Group>>,
    // Includes the main thread, hence the starting value of 1.
    total: AtomicUsize,
}

/// Process-wide registry of worker threads, grouped per subsystem.
#[derive(Clone)]
pub struct ThreadRegistry {
    inner: Arc<Inner>,
}

impl ThreadRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                groups: Mutex::new(Vec::new()),
                total: AtomicUsize::new(1),
            }),
        }
    }

    pub fn create_group(&self, name: &str) -> GroupHandle {
        let mut groups = self.inner.groups.lock();
        let index = groups.len();
        groups.push(Group { name: SmolStr::new(name), entries: Vec::new() });
        GroupHandle { inner: Arc::clone(&self.inner), index }
    }

    /// Live thread count across all groups, plus the main thread.
    ///
    /// Finished-but-unjoined threads are reaped first so the number reflects
    /// what is actually running.
    pub fn count_total(&self) -> usize {
        let mut groups = self.inner.groups.lock();
        for group in groups.iter_mut() {
            reap(group, &self.inner.total);
        }
        self.inner.total.load(Ordering::Acquire)
    }

    /// Labels of every live registered thread, as `group/label` pairs.
    ///
    /// Used by the landing summary and the watchdog's final fatal record.
    pub fn live_labels(&self) -> Vec<String> {
        let mut groups = self.inner.groups.lock();
        let mut labels = Vec::new();
        for group in groups.iter_mut() {
            reap(group, &self.inner.total);
            for entry in &group.entries {
                labels.push(format!("{}/{}", group.name, entry.label));
            }
        }
        labels
    }
}

impl Default for ThreadRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to one subsystem's bag of threads.
#[derive(Clone)]
pub struct GroupHandle {
    inner: Arc<Inner>,
    index: usize,
}

impl GroupHandle {
    pub fn name(&self) -> SmolStr {
        self.inner.groups.lock()[self.index].name.clone()
    }

    /// Register an already-spawned thread under this group.
    ///
    /// Registering the same OS thread twice is a no-op; the second handle is
    /// dropped (detaching it) rather than double-counted.
    pub fn register(&self, handle: JoinHandle<()>, label: &str) {
        let os_id = handle.thread().id();
        let mut groups = self.inner.groups.lock();
        let group = &mut groups[self.index];
        if group.entries.iter().any(|e| e.os_id == os_id) {
            return;
        }
        group.entries.push(Entry {
            label: SmolStr::new(label),
            os_id,
            handle,
            started_at: Instant::now(),
        });
        self.inner.total.fetch_add(1, Ordering::AcqRel);
    }

    /// Spawn a named thread and register it in one step.
    pub fn spawn<F>(&self, label: &str, f: F) -> Result<(), ThreadError>
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = std::thread::Builder::new()
            .name(label.to_string())
            .spawn(f)
            .map_err(|source| ThreadError::Spawn { label: label.to_string(), source })?;
        self.register(handle, label);
        Ok(())
    }

    /// Live threads in this group, reaping finished ones first.
    pub fn count(&self) -> usize {
        let mut groups = self.inner.groups.lock();
        let group = &mut groups[self.index];
        reap(group, &self.inner.total);
        group.entries.len()
    }

    /// Labels of the live threads in this group.
    pub fn labels(&self) -> Vec<String> {
        let mut groups = self.inner.groups.lock();
        let group = &mut groups[self.index];
        reap(group, &self.inner.total);
        group.entries.iter().map(|e| e.label.to_string()).collect()
    }

    /// Join every thread in the group, bounded by `timeout`.
    ///
    /// Polls rather than blocking in `join`, so a single stuck thread cannot
    /// pin the sequencer past its deadline.
    pub fn join_all(&self, timeout: Duration) -> JoinOutcome {
        let deadline = Instant::now() + timeout;
        loop {
            {
                let mut groups = self.inner.groups.lock();
                let group = &mut groups[self.index];
                reap(group, &self.inner.total);
                if group.entries.is_empty() {
                    return JoinOutcome::AllJoined;
                }
                if Instant::now() >= deadline {
                    let remaining =
                        group.entries.iter().map(|e| e.label.to_string()).collect();
                    return JoinOutcome::Timeout { remaining };
                }
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }
}

/// Join every finished entry in the group and drop it from the count.
fn reap(group: &mut Group, total: &AtomicUsize) {
    let mut i = 0;
    while i < group.entries.len() {
        if group.entries[i].handle.is_finished() {
            let entry = group.entries.swap_remove(i);
            // A worker that panicked still counts as exited; the join result
            // itself is not interesting here.
            let _ = entry.handle.join();
            total.fetch_sub(1, Ordering::AcqRel);
        } else {
            i += 1;
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
