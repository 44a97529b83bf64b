// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery destinations.
//!
//! A sink consumes pre-formatted lines from its drain thread. Write errors
//! are the sink's own problem to degrade around; the bus never fails a
//! caller because a sink is unhealthy.

use crate::record::LogRecord;
use hy_core::Level;
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// A log delivery destination.
pub trait Sink: Send {
    fn name(&self) -> &str;

    fn write_line(&mut self, line: &str, record: &LogRecord) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;

    /// Re-open underlying resources (SIGHUP log rotation). Default: no-op.
    fn reopen(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Stdout for routine records, stderr from Error upward.
pub struct ConsoleSink;

impl Sink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    fn write_line(&mut self, line: &str, record: &LogRecord) -> io::Result<()> {
        if record.level >= Level::Error {
            writeln!(io::stderr().lock(), "{line}")
        } else {
            writeln!(io::stdout().lock(), "{line}")
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().lock().flush()?;
        io::stderr().lock().flush()
    }
}

/// Append-only file sink with a size-capped roll.
///
/// When the current file exceeds `max_bytes`, it is renamed to `<path>.1`
/// (replacing any previous roll) and a fresh file is started.
pub struct FileSink {
    path: PathBuf,
    file: File,
    written: u64,
    max_bytes: u64,
}

impl FileSink {
    pub const DEFAULT_MAX_BYTES: u64 = 32 * 1024 * 1024;

    pub fn open(path: &Path, max_bytes: u64) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let written = file.metadata()?.len();
        Ok(Self { path: path.to_path_buf(), file, written, max_bytes })
    }

    fn roll(&mut self) -> io::Result<()> {
        self.file.flush()?;
        let mut rolled = self.path.clone().into_os_string();
        rolled.push(".1");
        std::fs::rename(&self.path, PathBuf::from(rolled))?;
        self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Sink for FileSink {
    fn name(&self) -> &str {
        "file"
    }

    fn write_line(&mut self, line: &str, _record: &LogRecord) -> io::Result<()> {
        if self.max_bytes > 0 && self.written + line.len() as u64 + 1 > self.max_bytes {
            self.roll()?;
        }
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        self.written += line.len() as u64 + 1;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }

    fn reopen(&mut self) -> io::Result<()> {
        self.file.flush()?;
        self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.written = self.file.metadata()?.len();
        Ok(())
    }
}

/// Persistent record storage behind the database sink.
///
/// The concrete engine (schema, dialect) lives with the database subsystem;
/// the bus only needs append and flush.
pub trait RecordStore: Send {
    fn append(&mut self, record: &LogRecord, line: &str) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Factory the database sink uses to (re)establish its store connection.
pub type StoreConnector = Box<dyn FnMut() -> Option<Box<dyn RecordStore>> + Send>;

/// Sink that treats its backing store as optional.
///
/// While disconnected it buffers up to `buffer_cap` lines, dropping the
/// oldest on overflow, and retries the connector on a write cadence. On
/// reconnect the buffer is replayed before the new line.
pub struct DatabaseSink {
    store: Option<Box<dyn RecordStore>>,
    connector: StoreConnector,
    buffer: VecDeque<(LogRecord, String)>,
    buffer_cap: usize,
    writes_since_attempt: usize,
    reconnect_every: usize,
    overflow_dropped: u64,
}

impl DatabaseSink {
    pub const DEFAULT_BUFFER_CAP: usize = 1024;
    const RECONNECT_EVERY: usize = 64;

    pub fn new(mut connector: StoreConnector, buffer_cap: usize) -> Self {
        let store = connector();
        Self {
            store,
            connector,
            buffer: VecDeque::new(),
            buffer_cap,
            writes_since_attempt: 0,
            reconnect_every: Self::RECONNECT_EVERY,
            overflow_dropped: 0,
        }
    }

    /// Lines discarded because the disconnected buffer overflowed.
    pub fn overflow_dropped(&self) -> u64 {
        self.overflow_dropped
    }

    fn buffer_line(&mut self, record: &LogRecord, line: &str) {
        if self.buffer.len() >= self.buffer_cap {
            self.buffer.pop_front();
            self.overflow_dropped += 1;
        }
        self.buffer.push_back((record.clone(), line.to_string()));
    }

    fn try_reconnect(&mut self) {
        self.writes_since_attempt = 0;
        if let Some(mut store) = (self.connector)() {
            // Replay the disconnected backlog before anything new.
            while let Some((record, line)) = self.buffer.pop_front() {
                if store.append(&record, &line).is_err() {
                    self.buffer.push_front((record, line));
                    return;
                }
            }
            self.store = Some(store);
        }
    }
}

impl Sink for DatabaseSink {
    fn name(&self) -> &str {
        "db"
    }

    fn write_line(&mut self, line: &str, record: &LogRecord) -> io::Result<()> {
        if let Some(store) = self.store.as_mut() {
            if store.append(record, line).is_ok() {
                return Ok(());
            }
            // Connection went bad mid-stream; fall back to buffering.
            self.store = None;
        }
        self.buffer_line(record, line);
        self.writes_since_attempt += 1;
        if self.writes_since_attempt >= self.reconnect_every {
            self.try_reconnect();
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.store.is_none() {
            self.try_reconnect();
        }
        if let Some(store) = self.store.as_mut() {
            store.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
