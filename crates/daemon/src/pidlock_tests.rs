// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn acquire_writes_our_pid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hydrogen.pid");
    let _lock = PidLock::acquire(&path).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written.trim(), std::process::id().to_string());
}

#[test]
fn second_acquire_in_the_same_process_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hydrogen.pid");
    let _lock = PidLock::acquire(&path).unwrap();
    // fs2 advisory locks are per-file-handle, so a second open in the same
    // process still contends.
    assert!(matches!(PidLock::acquire(&path).unwrap_err(), PidLockError::Locked(_)));
}

#[test]
fn release_removes_the_pid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hydrogen.pid");
    let lock = PidLock::acquire(&path).unwrap();
    lock.release();
    assert!(!path.exists());
    // And the lock is free again.
    let _again = PidLock::acquire(&path).unwrap();
}

#[test]
fn losing_contender_does_not_wipe_the_pid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hydrogen.pid");
    let _lock = PidLock::acquire(&path).unwrap();
    let _ = PidLock::acquire(&path);
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written.trim(), std::process::id().to_string());
}
