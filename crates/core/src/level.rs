// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log severities.
//!
//! Seven values, ordered. The first six are record severities; `Quiet` is a
//! filter-only value ordered above `Fatal`: setting a (sink, subsystem) pair
//! to `Quiet` in the level matrix suppresses every record for that pair,
//! Fatal included.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Log severity, chattiest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    /// Lifecycle milestones: state transitions, launch and landing reviews.
    State = 2,
    /// Conditions worth attention that did not fail an operation.
    Alert = 3,
    Error = 4,
    /// Crash-imminent; records at this level bypass the async queue.
    Fatal = 5,
    /// Filter-only suppression value, never attached to a record.
    Quiet = 6,
}

impl Level {
    pub const ALL: [Level; 7] = [
        Level::Trace,
        Level::Debug,
        Level::State,
        Level::Alert,
        Level::Error,
        Level::Fatal,
        Level::Quiet,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Level::Trace => "Trace",
            Level::Debug => "Debug",
            Level::State => "State",
            Level::Alert => "Alert",
            Level::Error => "Error",
            Level::Fatal => "Fatal",
            Level::Quiet => "Quiet",
        }
    }

    /// Six-character space-padded name used in the log file format.
    pub fn padded(self) -> &'static str {
        match self {
            Level::Trace => "Trace ",
            Level::Debug => "Debug ",
            Level::State => "State ",
            Level::Alert => "Alert ",
            Level::Error => "Error ",
            Level::Fatal => "Fatal ",
            Level::Quiet => "Quiet ",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown log level '{0}'")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "state" => Ok(Level::State),
            "alert" => Ok(Level::Alert),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            "quiet" => Ok(Level::Quiet),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "level_tests.rs"]
mod tests;
