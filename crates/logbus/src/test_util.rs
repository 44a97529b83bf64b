// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capture sink and in-memory record store for tests.

use crate::record::LogRecord;
use crate::sink::{RecordStore, Sink};
use hy_core::Level;
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;

/// Sink that retains everything it is handed, for assertions.
pub struct CaptureSink {
    name: &'static str,
    lines: Arc<Mutex<Vec<String>>>,
    records: Arc<Mutex<Vec<(String, Level, String)>>>,
}

/// Shared view into a [`CaptureSink`]'s output.
#[derive(Clone)]
pub struct Captured {
    lines: Arc<Mutex<Vec<String>>>,
    records: Arc<Mutex<Vec<(String, Level, String)>>>,
}

impl CaptureSink {
    pub fn new(name: &'static str) -> (Self, Captured) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let records = Arc::new(Mutex::new(Vec::new()));
        let captured = Captured { lines: Arc::clone(&lines), records: Arc::clone(&records) };
        (Self { name, lines, records }, captured)
    }
}

impl Captured {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// `(source, level, message)` triples in arrival order.
    pub fn records(&self) -> Vec<(String, Level, String)> {
        self.records.lock().clone()
    }

    pub fn messages_for(&self, source: &str) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .filter(|(s, _, _)| s == source)
            .map(|(_, _, m)| m.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

impl Sink for CaptureSink {
    fn name(&self) -> &str {
        self.name
    }

    fn write_line(&mut self, line: &str, record: &LogRecord) -> io::Result<()> {
        self.lines.lock().push(line.to_string());
        self.records.lock().push((
            record.source.to_string(),
            record.level,
            record.message.clone(),
        ));
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// In-memory [`RecordStore`] that can be flipped into a failing state.
pub struct MemoryStore {
    rows: Arc<Mutex<Vec<String>>>,
    healthy: Arc<Mutex<bool>>,
}

#[derive(Clone)]
pub struct MemoryStoreView {
    rows: Arc<Mutex<Vec<String>>>,
    healthy: Arc<Mutex<bool>>,
}

impl MemoryStore {
    pub fn new() -> (Self, MemoryStoreView) {
        let rows = Arc::new(Mutex::new(Vec::new()));
        let healthy = Arc::new(Mutex::new(true));
        let view = MemoryStoreView { rows: Arc::clone(&rows), healthy: Arc::clone(&healthy) };
        (Self { rows, healthy }, view)
    }
}

impl MemoryStoreView {
    pub fn rows(&self) -> Vec<String> {
        self.rows.lock().clone()
    }

    pub fn set_healthy(&self, healthy: bool) {
        *self.healthy.lock() = healthy;
    }
}

impl RecordStore for MemoryStore {
    fn append(&mut self, _record: &LogRecord, line: &str) -> io::Result<()> {
        if !*self.healthy.lock() {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "store offline"));
        }
        self.rows.lock().push(line.to_string());
        Ok(())
    }
}
