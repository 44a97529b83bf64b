// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exclusive PID/lock file.
//!
//! One daemon per state directory. The lock is taken before the file is
//! truncated, so a losing contender never wipes the running daemon's PID.

use fs2::FileExt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PidLockError {
    #[error("failed to acquire lock: daemon already running?")]
    Locked(#[source] std::io::Error),

    #[error("i/o error on lock file: {0}")]
    Io(#[from] std::io::Error),
}

/// Held for the daemon's lifetime; the OS lock releases on drop.
#[derive(Debug)]
pub struct PidLock {
    // NOTE(lifetime): held to keep the exclusive lock; released on drop
    #[allow(dead_code)]
    file: File,
    path: PathBuf,
}

impl PidLock {
    pub fn acquire(path: &Path) -> Result<Self, PidLockError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        file.try_lock_exclusive().map_err(PidLockError::Locked)?;

        let mut file = file;
        file.set_len(0)?;
        writeln!(file, "{}", std::process::id())?;
        Ok(Self { file, path: path.to_path_buf() })
    }

    /// Remove the pid file on clean shutdown. The lock itself releases when
    /// the handle drops.
    pub fn release(self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
#[path = "pidlock_tests.rs"]
mod tests;
