// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The subsystem registry: identity, state, dependencies, lifecycle hooks.
//!
//! Guarded by a single reader-writer lock. Mutations take the write lock;
//! state reads take the read lock. No lifecycle hook ever runs while a lock
//! is held: the sequencers clone the hook cell out, release, and invoke.
//!
//! Names key the public API; a compact integer id is assigned at
//! registration and is the canonical handle internally.

use crate::subsystem::Subsystem;
use hy_core::ShutdownFlag;
use hy_logbus::BusHandle;
use hy_threads::{GroupHandle, ThreadRegistry};
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use smol_str::SmolStr;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Compact canonical handle assigned at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubsystemId(pub u16);

/// Lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubState {
    Inactive,
    Ready,
    Starting,
    Running,
    Stopping,
    Error,
}

impl SubState {
    /// The legal transition table. Everything else is rejected.
    pub fn can_transition(self, to: SubState) -> bool {
        use SubState::*;
        matches!(
            (self, to),
            (Inactive, Ready)        // readiness passed
                | (Ready, Starting)  // launch invoked init
                | (Starting, Running)
                | (Starting, Error)
                | (Running, Stopping)
                | (Stopping, Inactive)
                | (Stopping, Error)
                | (Error, Inactive)  // manual reset only
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            SubState::Inactive => "Inactive",
            SubState::Ready => "Ready",
            SubState::Starting => "Starting",
            SubState::Running => "Running",
            SubState::Stopping => "Stopping",
            SubState::Error => "Error",
        }
    }
}

impl std::fmt::Display for SubState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("subsystem '{0}' is already registered")]
    DuplicateName(String),

    #[error("adding '{name}' would create a dependency cycle")]
    Cycle { name: String },

    #[error("subsystem '{0}' is not registered")]
    NotFound(String),

    #[error("'{name}' cannot be removed: '{dependent}' depends on it")]
    DependedUpon { name: String, dependent: String },

    #[error("'{0}' cannot be removed while {1}")]
    NotInactive(String, &'static str),
}

/// Everything the registry tracks per subsystem.
pub(crate) struct Record {
    pub id: SubsystemId,
    pub state: SubState,
    pub state_changed_at: Instant,
    pub started_at: Option<Instant>,
    pub deps: Vec<SmolStr>,
    pub group: GroupHandle,
    pub shutdown: ShutdownFlag,
    pub hook: Arc<Mutex<Box<dyn Subsystem>>>,
    /// No-go or failure reason from the most recent pass.
    pub reason: Option<String>,
}

struct Inner {
    records: IndexMap<SmolStr, Record>,
    next_id: u16,
}

/// Single source of truth for subsystem identity, state and dependencies.
pub struct SubsystemRegistry {
    inner: RwLock<Inner>,
    log: BusHandle,
}

/// Read-only line for reviews and monitoring.
#[derive(Debug, Clone)]
pub struct SubsystemSnapshot {
    pub name: SmolStr,
    pub state: SubState,
    pub reason: Option<String>,
    pub running_for: Option<std::time::Duration>,
    pub thread_count: usize,
}

impl SubsystemRegistry {
    pub fn new(log: BusHandle) -> Self {
        Self {
            inner: RwLock::new(Inner { records: IndexMap::new(), next_id: 0 }),
            log,
        }
    }

    /// Register a subsystem. Fails on duplicate names and on dependency
    /// cycles among the subsystems present so far; dependencies on names
    /// not (yet) registered are allowed and simply never count as Running.
    pub fn add(
        &self,
        subsystem: Box<dyn Subsystem>,
        threads: &ThreadRegistry,
    ) -> Result<SubsystemId, RegistryError> {
        let name = SmolStr::new(subsystem.name());
        let deps = subsystem.dependencies();
        let mut inner = self.inner.write();

        if inner.records.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }
        if has_cycle(&inner.records, &name, &deps) {
            return Err(RegistryError::Cycle { name: name.to_string() });
        }

        let id = SubsystemId(inner.next_id);
        inner.next_id += 1;
        inner.records.insert(
            name.clone(),
            Record {
                id,
                state: SubState::Inactive,
                state_changed_at: Instant::now(),
                started_at: None,
                deps,
                group: threads.create_group(&name),
                shutdown: ShutdownFlag::new(),
                hook: Arc::new(Mutex::new(subsystem)),
                reason: None,
            },
        );
        Ok(id)
    }

    /// Remove an Inactive subsystem nobody depends on. The remaining
    /// records keep their relative order, so the topo order returns to what
    /// it was before the matching `add`.
    pub fn remove(&self, name: &str) -> Result<(), RegistryError> {
        let mut inner = self.inner.write();
        let record = inner
            .records
            .get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        if record.state != SubState::Inactive {
            return Err(RegistryError::NotInactive(name.to_string(), "not Inactive"));
        }
        if let Some((dependent, _)) = inner
            .records
            .iter()
            .find(|(other, rec)| other.as_str() != name && rec.deps.iter().any(|d| d == name))
        {
            return Err(RegistryError::DependedUpon {
                name: name.to_string(),
                dependent: dependent.to_string(),
            });
        }
        inner.records.shift_remove(name);
        Ok(())
    }

    /// Apply a state transition if the table allows it. An illegal
    /// transition is a no-op logged at Error.
    pub fn set_state(&self, name: &str, to: SubState) -> bool {
        let mut inner = self.inner.write();
        let Some(from) = inner.records.get(name).map(|r| r.state) else {
            drop(inner);
            self.log.error(format!("state change for unknown subsystem '{name}'"));
            return false;
        };
        if !from.can_transition(to) {
            drop(inner);
            self.log.error(format!("rejected transition {from} -> {to} for '{name}'"));
            return false;
        }
        if let Some(record) = inner.records.get_mut(name) {
            record.state = to;
            record.state_changed_at = Instant::now();
            if to == SubState::Running {
                record.started_at = Some(record.state_changed_at);
            }
        }
        true
    }

    pub fn state(&self, name: &str) -> Option<SubState> {
        self.inner.read().records.get(name).map(|r| r.state)
    }

    pub fn id(&self, name: &str) -> Option<SubsystemId> {
        self.inner.read().records.get(name).map(|r| r.id)
    }

    pub fn set_reason(&self, name: &str, reason: impl Into<String>) {
        if let Some(record) = self.inner.write().records.get_mut(name) {
            record.reason = Some(reason.into());
        }
    }

    /// Names in dependency order: Kahn's algorithm, ties broken by
    /// insertion order, so every run is deterministic.
    pub fn topo_order(&self) -> Vec<SmolStr> {
        let inner = self.inner.read();
        let records = &inner.records;
        let n = records.len();

        // in_degree counts only edges between registered subsystems.
        let mut in_degree = vec![0usize; n];
        for (index, (_, record)) in records.iter().enumerate() {
            in_degree[index] =
                record.deps.iter().filter(|dep| records.contains_key(*dep)).count();
        }

        let mut order = Vec::with_capacity(n);
        let mut done = vec![false; n];
        loop {
            // Lowest insertion index first keeps the tie-break stable.
            let picked = records
                .iter()
                .enumerate()
                .find(|(index, _)| !done[*index] && in_degree[*index] == 0)
                .map(|(index, (name, _))| (index, name.clone()));
            let Some((index, name)) = picked else { break };
            done[index] = true;
            for (other, (_, record)) in records.iter().enumerate() {
                if !done[other] && record.deps.iter().any(|dep| *dep == name) {
                    in_degree[other] -= 1;
                }
            }
            order.push(name);
        }
        order
    }

    /// Names currently in the Running state.
    pub fn running_set(&self) -> HashSet<SmolStr> {
        self.inner
            .read()
            .records
            .iter()
            .filter(|(_, r)| r.state == SubState::Running)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Clone out what a sequencer needs to drive a subsystem, so no hook
    /// runs under the registry lock.
    pub fn lifecycle_refs(
        &self,
        name: &str,
    ) -> Option<(Arc<Mutex<Box<dyn Subsystem>>>, GroupHandle, ShutdownFlag, Vec<SmolStr>)> {
        let inner = self.inner.read();
        let record = inner.records.get(name)?;
        Some((
            Arc::clone(&record.hook),
            record.group.clone(),
            record.shutdown.clone(),
            record.deps.clone(),
        ))
    }

    /// Per-subsystem status lines for the launch and landing reviews.
    pub fn snapshot(&self, now: Instant) -> Vec<SubsystemSnapshot> {
        let inner = self.inner.read();
        inner
            .records
            .iter()
            .map(|(name, record)| SubsystemSnapshot {
                name: name.clone(),
                state: record.state,
                reason: record.reason.clone(),
                running_for: match record.state {
                    SubState::Running => {
                        record.started_at.map(|started| now.saturating_duration_since(started))
                    }
                    _ => None,
                },
                thread_count: record.group.count(),
            })
            .collect()
    }

    pub fn names(&self) -> Vec<SmolStr> {
        self.inner.read().records.keys().cloned().collect()
    }
}

/// Would adding `name` with `deps` close a cycle among present subsystems?
fn has_cycle(records: &IndexMap<SmolStr, Record>, name: &SmolStr, deps: &[SmolStr]) -> bool {
    // Walk outward from the new node's dependencies; a path back to `name`
    // through existing dependency edges means a cycle.
    let mut stack: Vec<&SmolStr> = deps.iter().collect();
    let mut seen: HashSet<&SmolStr> = HashSet::new();
    while let Some(current) = stack.pop() {
        if current == name {
            return true;
        }
        if !seen.insert(current) {
            continue;
        }
        if let Some(record) = records.get(current) {
            stack.extend(record.deps.iter());
        }
    }
    false
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
