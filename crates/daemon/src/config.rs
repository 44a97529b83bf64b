// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration.
//!
//! Loaded from `hydrogen.toml` via the core config tree, with defaults for
//! everything. Unknown keys are collected here and logged at Alert once the
//! bus is up; they never prevent startup.

use hy_core::{Config, ConfigError, Level};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonConfigError {
    #[error("could not determine state directory")]
    NoStateDir,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A per-(sink, subsystem) level override from the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelOverride {
    pub sink: String,
    pub source: String,
    pub level: Level,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub queue_capacity: usize,
    pub console_enabled: bool,
    pub console_level: Level,
    pub file_enabled: bool,
    pub file_path: PathBuf,
    pub file_level: Level,
    pub file_max_bytes: u64,
    pub overrides: Vec<LevelOverride>,
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Root state directory (e.g. ~/.local/state/hydrogen).
    pub state_dir: PathBuf,
    /// Path to the PID/lock file.
    pub lock_path: PathBuf,
    pub logging: LoggingConfig,
    /// The raw tree, handed to subsystem readiness checks.
    pub tree: Config,
    /// Keys nothing recognizes, for an Alert once logging is up.
    pub unknown_keys: Vec<String>,
}

const KNOWN_SECTIONS: &[&str] =
    &["state_dir", "logging", "webserver", "mdns", "database", "printqueue"];
const KNOWN_LOGGING_KEYS: &[&str] =
    &["queue_capacity", "console", "file", "levels"];

impl DaemonConfig {
    /// Load from an optional file path, falling back to defaults.
    pub fn load(
        path: Option<&std::path::Path>,
        state_dir_override: Option<PathBuf>,
    ) -> Result<Self, DaemonConfigError> {
        let tree = match path {
            Some(path) => Config::from_path(path)?,
            None => Config::empty(),
        };
        Self::from_tree(tree, state_dir_override)
    }

    pub fn from_tree(
        tree: Config,
        state_dir_override: Option<PathBuf>,
    ) -> Result<Self, DaemonConfigError> {
        let state_dir = state_dir_override
            .or_else(|| tree.get_str("state_dir").map(PathBuf::from))
            .or_else(default_state_dir)
            .ok_or(DaemonConfigError::NoStateDir)?;

        let logging = LoggingConfig {
            queue_capacity: tree.i64_or("logging.queue_capacity", 1024).max(1) as usize,
            console_enabled: tree.bool_or("logging.console.enabled", true),
            console_level: level_at(&tree, "logging.console.level", Level::State),
            file_enabled: tree.bool_or("logging.file.enabled", true),
            file_path: tree
                .get_str("logging.file.path")
                .map(PathBuf::from)
                .unwrap_or_else(|| state_dir.join("hydrogen.log")),
            file_level: level_at(&tree, "logging.file.level", Level::Debug),
            file_max_bytes: tree.i64_or("logging.file.max_bytes", 32 * 1024 * 1024).max(0) as u64,
            overrides: level_overrides(&tree),
        };

        let mut unknown_keys = tree.unknown_keys("", KNOWN_SECTIONS);
        unknown_keys.extend(tree.unknown_keys("logging", KNOWN_LOGGING_KEYS));

        Ok(Self {
            lock_path: state_dir.join("hydrogen.pid"),
            state_dir,
            logging,
            tree,
            unknown_keys,
        })
    }
}

fn default_state_dir() -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|dir| dir.join("hydrogen"))
}

fn level_at(tree: &Config, path: &str, default: Level) -> Level {
    tree.get_str(path).and_then(|s| s.parse().ok()).unwrap_or(default)
}

/// Parse `[logging.levels.<sink>]` tables: `subsystem = "level"` pairs.
fn level_overrides(tree: &Config) -> Vec<LevelOverride> {
    let mut overrides = Vec::new();
    let Some(sinks) = tree.get("logging.levels").and_then(|v| v.as_table()) else {
        return overrides;
    };
    for (sink, entries) in sinks {
        let Some(entries) = entries.as_table() else { continue };
        for (source, value) in entries {
            let Some(level) = value.as_str().and_then(|s| s.parse().ok()) else {
                continue;
            };
            overrides.push(LevelOverride {
                sink: sink.clone(),
                source: source.clone(),
                level,
            });
        }
    }
    overrides
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
