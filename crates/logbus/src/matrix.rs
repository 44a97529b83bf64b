// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The (sink, subsystem) → minimum level matrix.
//!
//! Each sink has a default minimum level; any (sink, subsystem) pair may
//! override it at runtime. `Quiet` as the effective minimum suppresses the
//! pair entirely, Fatal included.

use hy_core::Level;
use parking_lot::RwLock;
use smol_str::SmolStr;
use std::collections::HashMap;

struct MatrixInner {
    defaults: Vec<Level>,
    overrides: HashMap<(usize, SmolStr), Level>,
}

pub struct LevelMatrix {
    inner: RwLock<MatrixInner>,
}

impl LevelMatrix {
    /// One default level per sink, indexed by sink id.
    pub fn new(defaults: Vec<Level>) -> Self {
        Self {
            inner: RwLock::new(MatrixInner { defaults, overrides: HashMap::new() }),
        }
    }

    /// Effective minimum for a (sink, subsystem) pair.
    pub fn min_level(&self, sink: usize, source: &str) -> Level {
        let inner = self.inner.read();
        inner
            .overrides
            .get(&(sink, SmolStr::new(source)))
            .copied()
            .or_else(|| inner.defaults.get(sink).copied())
            .unwrap_or(Level::Trace)
    }

    /// Whether a record at `level` passes for the pair. Takes effect at the
    /// next record; in-flight records are unaffected.
    pub fn enabled(&self, sink: usize, source: &str, level: Level) -> bool {
        if level >= Level::Quiet {
            return false;
        }
        let min = self.min_level(sink, source);
        min < Level::Quiet && level >= min
    }

    pub fn set_level(&self, sink: usize, source: &str, level: Level) {
        self.inner.write().overrides.insert((sink, SmolStr::new(source)), level);
    }

    pub fn set_default(&self, sink: usize, level: Level) {
        let mut inner = self.inner.write();
        if let Some(slot) = inner.defaults.get_mut(sink) {
            *slot = level;
        }
    }

    /// Remove a pair override, falling back to the sink default.
    pub fn clear_level(&self, sink: usize, source: &str) {
        self.inner.write().overrides.remove(&(sink, SmolStr::new(source)));
    }
}

#[cfg(test)]
#[path = "matrix_tests.rs"]
mod tests;
