// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-subsystem view onto the bus.
//!
//! Subsystems never see the whole bus; they get a handle pre-bound to their
//! source name, exposing only record submission.

use crate::bus::LogBus;
use hy_core::Level;
use smol_str::SmolStr;

/// A source-bound logging handle, cheap to clone into worker threads.
#[derive(Clone)]
pub struct BusHandle {
    bus: LogBus,
    source: SmolStr,
}

impl BusHandle {
    pub fn new(bus: LogBus, source: &str) -> Self {
        Self { bus, source: SmolStr::new(source) }
    }

    /// The same bus, bound to a different source name.
    pub fn for_source(&self, source: &str) -> Self {
        Self { bus: self.bus.clone(), source: SmolStr::new(source) }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn log(&self, level: Level, message: impl Into<String>) {
        self.bus.log(&self.source, level, message);
    }

    pub fn trace(&self, message: impl Into<String>) {
        self.log(Level::Trace, message);
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::Debug, message);
    }

    pub fn state(&self, message: impl Into<String>) {
        self.log(Level::State, message);
    }

    pub fn alert(&self, message: impl Into<String>) {
        self.log(Level::Alert, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::Error, message);
    }

    pub fn fatal(&self, message: impl Into<String>) {
        self.log(Level::Fatal, message);
    }
}
