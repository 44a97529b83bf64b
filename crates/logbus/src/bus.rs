// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The bus: bounded per-sink queues, one drain thread per sink.
//!
//! `log` never fails and never blocks beyond a bounded enqueue; a saturated
//! queue drops the record and bumps the sink's drop counter, which the drain
//! thread summarizes periodically at State level. Fatal records bypass the
//! queue and are written synchronously from the producing thread.

use crate::format::format_line;
use crate::matrix::LevelMatrix;
use crate::record::LogRecord;
use crate::sink::Sink;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use hy_core::{Clock, Level};
use hy_threads::{GroupHandle, ThreadError, ThreadRegistry};
use parking_lot::Mutex;
use smol_str::SmolStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Internal source name for the bus's own records.
const BUS_SOURCE: &str = "logbus";

/// How often an idle drain thread checks for unreported drops.
const SUMMARY_TICK: Duration = Duration::from_secs(5);

enum Command {
    Record(Arc<LogRecord>),
    Flush(Sender<()>),
    Shutdown,
}

struct Lane {
    name: SmolStr,
    sink: Arc<Mutex<Box<dyn Sink>>>,
    tx: Sender<Command>,
    dropped: Arc<AtomicU64>,
}

struct BusInner {
    clock: Arc<dyn Clock>,
    lanes: Vec<Lane>,
    matrix: LevelMatrix,
    group: GroupHandle,
}

/// Multi-sink asynchronous log delivery. Cheap to clone; all clones share
/// the same lanes.
#[derive(Clone)]
pub struct LogBus {
    inner: Arc<BusInner>,
}

/// Assembles sinks and their default levels, then starts the drain threads.
pub struct LogBusBuilder {
    queue_capacity: usize,
    sinks: Vec<(Box<dyn Sink>, Level)>,
}

impl Default for LogBusBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LogBusBuilder {
    pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

    pub fn new() -> Self {
        Self { queue_capacity: Self::DEFAULT_QUEUE_CAPACITY, sinks: Vec::new() }
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    pub fn sink(mut self, sink: Box<dyn Sink>, default_level: Level) -> Self {
        self.sinks.push((sink, default_level));
        self
    }

    /// Spawn one drain thread per sink (registered under a `logging` group)
    /// and hand back the running bus.
    pub fn start(
        self,
        clock: Arc<dyn Clock>,
        threads: &ThreadRegistry,
    ) -> Result<LogBus, ThreadError> {
        let group = threads.create_group("logging");
        let defaults: Vec<Level> = self.sinks.iter().map(|(_, level)| *level).collect();
        let mut lanes = Vec::with_capacity(self.sinks.len());

        for (sink, _) in self.sinks {
            let name = SmolStr::new(sink.name());
            let sink = Arc::new(Mutex::new(sink));
            let dropped = Arc::new(AtomicU64::new(0));
            let (tx, rx) = bounded(self.queue_capacity);

            let drain_sink = Arc::clone(&sink);
            let drain_dropped = Arc::clone(&dropped);
            let drain_name = name.clone();
            let drain_clock = Arc::clone(&clock);
            group.spawn(&format!("sink-{name}"), move || {
                drain(drain_sink, rx, drain_dropped, drain_name, drain_clock);
            })?;

            lanes.push(Lane { name, sink, tx, dropped });
        }

        Ok(LogBus {
            inner: Arc::new(BusInner {
                clock,
                lanes,
                matrix: LevelMatrix::new(defaults),
                group,
            }),
        })
    }
}

impl LogBus {
    /// Accept a record. Never fails; at worst the record is dropped and
    /// counted.
    pub fn log(&self, source: &str, level: Level, message: impl Into<String>) {
        if level >= Level::Quiet {
            return;
        }
        let record = Arc::new(LogRecord::new(
            source,
            level,
            self.inner.clock.now_wall_ms(),
            message.into(),
        ));
        if level == Level::Fatal {
            self.write_sync(&record);
            return;
        }
        for (id, lane) in self.inner.lanes.iter().enumerate() {
            if !self.inner.matrix.enabled(id, source, level) {
                continue;
            }
            if lane.tx.try_send(Command::Record(Arc::clone(&record))).is_err() {
                lane.dropped.fetch_add(1, Ordering::AcqRel);
            }
        }
    }

    /// Synchronous write used for Fatal records: takes each sink lock
    /// directly so the message survives an imminent crash.
    fn write_sync(&self, record: &LogRecord) {
        let line = format_line(record);
        for (id, lane) in self.inner.lanes.iter().enumerate() {
            if !self.inner.matrix.enabled(id, &record.source, record.level) {
                continue;
            }
            let mut sink = lane.sink.lock();
            let _ = sink.write_line(&line, record);
            let _ = sink.flush();
        }
    }

    /// Drain every queue, bounded by `deadline`. Returns whether every sink
    /// acknowledged in time.
    pub fn flush(&self, deadline: Duration) -> bool {
        let until = Instant::now() + deadline;
        let mut all_drained = true;
        for lane in &self.inner.lanes {
            let (ack_tx, ack_rx) = bounded(1);
            let remaining = until.saturating_duration_since(Instant::now());
            if lane.tx.send_timeout(Command::Flush(ack_tx), remaining).is_err() {
                all_drained = false;
                continue;
            }
            let remaining = until.saturating_duration_since(Instant::now());
            if ack_rx.recv_timeout(remaining).is_err() {
                all_drained = false;
            }
        }
        all_drained
    }

    /// Flush, stop the drain threads and join them. Records logged after
    /// this are dropped and counted.
    pub fn shutdown(&self, deadline: Duration) -> bool {
        let until = Instant::now() + deadline;
        for lane in &self.inner.lanes {
            let remaining = until.saturating_duration_since(Instant::now());
            let _ = lane.tx.send_timeout(Command::Shutdown, remaining);
        }
        let remaining = until.saturating_duration_since(Instant::now());
        matches!(self.inner.group.join_all(remaining), hy_threads::JoinOutcome::AllJoined)
    }

    /// Re-open file-backed sinks (SIGHUP log rotation).
    pub fn reopen_sinks(&self) {
        for lane in &self.inner.lanes {
            let _ = lane.sink.lock().reopen();
        }
    }

    pub fn set_level(&self, sink: &str, source: &str, level: Level) {
        if let Some(id) = self.sink_id(sink) {
            self.inner.matrix.set_level(id, source, level);
        }
    }

    pub fn set_default_level(&self, sink: &str, level: Level) {
        if let Some(id) = self.sink_id(sink) {
            self.inner.matrix.set_default(id, level);
        }
    }

    pub fn get_level(&self, sink: &str, source: &str) -> Option<Level> {
        Some(self.inner.matrix.min_level(self.sink_id(sink)?, source))
    }

    /// Records dropped on a sink because its queue was saturated.
    pub fn dropped_count(&self, sink: &str) -> u64 {
        self.sink_id(sink)
            .map(|id| self.inner.lanes[id].dropped.load(Ordering::Acquire))
            .unwrap_or(0)
    }

    pub fn sink_names(&self) -> Vec<SmolStr> {
        self.inner.lanes.iter().map(|lane| lane.name.clone()).collect()
    }

    fn sink_id(&self, sink: &str) -> Option<usize> {
        self.inner.lanes.iter().position(|lane| lane.name == sink)
    }
}

fn drain(
    sink: Arc<Mutex<Box<dyn Sink>>>,
    rx: Receiver<Command>,
    dropped: Arc<AtomicU64>,
    sink_name: SmolStr,
    clock: Arc<dyn Clock>,
) {
    let mut reported: u64 = 0;
    loop {
        match rx.recv_timeout(SUMMARY_TICK) {
            Ok(Command::Record(record)) => {
                let line = format_line(&record);
                let mut sink = sink.lock();
                let _ = sink.write_line(&line, &record);
            }
            Ok(Command::Flush(ack)) => {
                // Everything queued before the flush command has already
                // been handed to the sink; just push it out.
                let _ = sink.lock().flush();
                let _ = ack.send(());
            }
            Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                let _ = sink.lock().flush();
                break;
            }
            Err(RecvTimeoutError::Timeout) => {
                let total = dropped.load(Ordering::Acquire);
                if total > reported {
                    let summary = LogRecord::new(
                        BUS_SOURCE,
                        Level::State,
                        clock.now_wall_ms(),
                        format!(
                            "sink '{sink_name}': {} record(s) dropped since last summary",
                            total - reported
                        ),
                    );
                    let line = format_line(&summary);
                    let mut sink = sink.lock();
                    let _ = sink.write_line(&line, &summary);
                    reported = total;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
