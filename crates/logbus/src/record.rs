// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The log record as it travels the bus.

use hy_core::Level;
use smol_str::SmolStr;
use std::time::Instant;

/// One pre-formatted message on its way to the sinks.
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Subsystem name.
    pub source: SmolStr,
    pub level: Level,
    /// Wall-clock milliseconds since the epoch, for display only.
    pub wall_ms: u64,
    /// Monotonic capture instant, for latency accounting.
    pub mono: Instant,
    /// Name of the emitting thread, when it has one.
    pub thread_label: Option<SmolStr>,
    pub message: String,
}

impl LogRecord {
    pub fn new(source: &str, level: Level, wall_ms: u64, message: String) -> Self {
        let thread_label = std::thread::current().name().map(SmolStr::new);
        Self {
            source: SmolStr::new(source),
            level,
            wall_ms,
            mono: Instant::now(),
            thread_label,
            message,
        }
    }
}
