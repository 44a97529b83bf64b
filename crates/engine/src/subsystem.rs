// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The plug-in contract every subsystem implements.

use crate::context::SubsystemCtx;
use crate::readiness::{ReadinessCtx, ReadinessReport};
use smol_str::SmolStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubsystemError {
    #[error("{0}")]
    Failed(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Thread(#[from] hy_threads::ThreadError),
}

impl SubsystemError {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }
}

/// A named, independently-startable component with a fixed lifecycle.
///
/// Implementations are trait objects owned by the registry, so each carries
/// its own private state alongside its hooks. The sequencers call `init` and
/// `stop` at most once per lifecycle pass, never concurrently, and `stop`
/// only after an `init` that returned `Ok`.
pub trait Subsystem: Send {
    /// Stable unique identifier; also the log source name.
    fn name(&self) -> &str;

    /// Names of subsystems that must be Running before this one may start.
    fn dependencies(&self) -> Vec<SmolStr> {
        Vec::new()
    }

    /// Pure go/no-go check. Must not spawn threads, open sockets, or
    /// reserve resources; reservations belong in `init`.
    fn readiness(&self, ctx: &ReadinessCtx) -> ReadinessReport;

    /// Bring the subsystem up. May spawn workers, each registered through
    /// `ctx.threads`; must return within the launch deadline.
    fn init(&mut self, ctx: &SubsystemCtx) -> Result<(), SubsystemError>;

    /// Initiate orderly termination. Returns after signaling its workers,
    /// not after joining them; joining is the sequencer's job.
    fn stop(&mut self) -> Result<(), SubsystemError>;
}
