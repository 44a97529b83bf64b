// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The print queue subsystem.
//!
//! A single spooler thread drains a bounded job channel. Completed jobs are
//! accounted through the database pool via the pending-result relay, which
//! makes this the in-tree example of one subsystem consuming another's
//! request/response surface. Printer protocol handling is the print
//! collaborator's concern.

use crate::subsystems::database::DbPool;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use hy_core::{Config, ShutdownFlag};
use hy_engine::{
    ReadinessCtx, ReadinessReport, ReportBuilder, Subsystem, SubsystemCtx, SubsystemError, Verdict,
};
use hy_logbus::BusHandle;
use hy_relay::WaitOutcome;
use smol_str::SmolStr;
use std::time::Duration;

const NAME: &str = "printqueue";
const IDLE_WAIT: Duration = Duration::from_millis(100);

/// Budget for the accounting query; a slow pool must not wedge the spooler.
const ACCOUNTING_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct PrintJob {
    pub id: String,
    pub document: String,
}

/// Submission handle for request handlers.
#[derive(Clone)]
pub struct PrintQueue {
    tx: Sender<PrintJob>,
}

impl PrintQueue {
    /// Returns the job back to the caller when the queue is full.
    pub fn submit(&self, job: PrintJob) -> Result<(), PrintJob> {
        self.tx.try_send(job).map_err(|err| err.into_inner())
    }
}

pub struct PrintQueueSubsystem {
    enabled: bool,
    queue: PrintQueue,
    rx: Receiver<PrintJob>,
    db: DbPool,
}

impl PrintQueueSubsystem {
    pub fn from_config(config: &Config, db: DbPool) -> Self {
        let depth = config.i64_or("printqueue.queue_depth", 32).max(1) as usize;
        let (tx, rx) = bounded(depth);
        Self {
            enabled: config.bool_or("printqueue.enabled", true),
            queue: PrintQueue { tx },
            rx,
            db,
        }
    }

    pub fn queue(&self) -> PrintQueue {
        self.queue.clone()
    }
}

impl Subsystem for PrintQueueSubsystem {
    fn name(&self) -> &str {
        NAME
    }

    fn dependencies(&self) -> Vec<SmolStr> {
        vec![SmolStr::new("database")]
    }

    fn readiness(&self, ctx: &ReadinessCtx) -> ReadinessReport {
        let config = if self.enabled {
            Verdict::go("spooler configured")
        } else {
            Verdict::no_go("disabled by configuration")
        };
        ReportBuilder::new(NAME)
            .system_from(&ctx.process)
            .config(config)
            .deps_from(&self.dependencies(), ctx)
            .build()
    }

    fn init(&mut self, ctx: &SubsystemCtx) -> Result<(), SubsystemError> {
        let rx = self.rx.clone();
        let db = self.db.clone();
        let shutdown = ctx.shutdown.clone();
        let log = ctx.log.clone();
        ctx.threads.spawn("spooler", move || {
            spool_loop(rx, db, shutdown, log);
        })?;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SubsystemError> {
        Ok(())
    }
}

fn spool_loop(rx: Receiver<PrintJob>, db: DbPool, shutdown: ShutdownFlag, log: BusHandle) {
    loop {
        match rx.recv_timeout(IDLE_WAIT) {
            Ok(job) => {
                log.state(format!("printing job {} ({} bytes)", job.id, job.document.len()));
                account(&db, &job, &log);
            }
            Err(RecvTimeoutError::Timeout) => {
                if shutdown.is_signaled() {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn account(db: &DbPool, job: &PrintJob, log: &BusHandle) {
    let statement = format!("insert into print_jobs (id) values ('{}')", job.id);
    let ticket = match db.submit(&statement, ACCOUNTING_TIMEOUT) {
        Ok(ticket) => ticket,
        Err(err) => {
            log.alert(format!("accounting submit for job {} failed: {err}", job.id));
            return;
        }
    };
    match db.wait(ticket) {
        WaitOutcome::Delivered(delivery) if delivery.ok => {}
        WaitOutcome::Delivered(delivery) => log.alert(format!(
            "accounting for job {} failed: {}",
            job.id,
            delivery.error.unwrap_or_else(|| "unknown error".to_string())
        )),
        WaitOutcome::TimedOut => {
            log.alert(format!("accounting for job {} timed out", job.id));
        }
        WaitOutcome::Cancelled => {}
    }
}

#[cfg(test)]
#[path = "printqueue_tests.rs"]
mod tests;
