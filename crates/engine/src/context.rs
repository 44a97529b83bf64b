// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Explicit context structures.
//!
//! There are no globals: the binary builds a [`CoreCtx`] in initialization
//! order (clock, flags, bus, thread registry) and passes it to the
//! sequencers. Each subsystem receives only a [`SubsystemCtx`], the narrow
//! typed handle exposing the operations it actually needs.

use hy_core::{Clock, Config, ProcessState, ShutdownFlag};
use hy_logbus::{BusHandle, LogBus};
use hy_threads::{GroupHandle, ThreadRegistry};
use std::sync::Arc;

/// Everything the sequencers need, built once at process entry.
#[derive(Clone)]
pub struct CoreCtx {
    pub clock: Arc<dyn Clock>,
    pub process: Arc<ProcessState>,
    pub config: Config,
    pub bus: LogBus,
    pub threads: ThreadRegistry,
}

impl CoreCtx {
    pub fn log(&self, source: &str) -> BusHandle {
        BusHandle::new(self.bus.clone(), source)
    }
}

/// The view a subsystem gets during `init`: logging bound to its own source
/// name, its thread group, its shutdown flag, and the read-only process
/// flags. Cloned freely into worker threads.
#[derive(Clone)]
pub struct SubsystemCtx {
    pub log: BusHandle,
    pub threads: GroupHandle,
    pub shutdown: ShutdownFlag,
    pub process: Arc<ProcessState>,
}
