// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The database connection pool subsystem.
//!
//! A fixed-size pool of worker threads drains a bounded query channel;
//! replies travel back through the pending-result relay, so a request
//! handler on any thread can submit a query and block on the reply with a
//! timeout. The query engine itself is a stub: dialect translation is the
//! database collaborator's concern, not the pool's.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use hy_core::{Config, ShutdownFlag};
use hy_engine::{
    ReadinessCtx, ReadinessReport, ReportBuilder, Subsystem, SubsystemCtx, SubsystemError, Verdict,
};
use hy_logbus::BusHandle;
use hy_relay::{Delivery, RegisterError, Relay, Ticket, WaitOutcome};
use smol_str::SmolStr;
use std::time::Duration;
use thiserror::Error;

const NAME: &str = "database";
const MAX_WORKERS: i64 = 32;

/// How long workers sleep on an empty queue before re-checking shutdown.
const IDLE_WAIT: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Register(#[from] RegisterError),
}

pub struct QueryRequest {
    pub correlation_id: String,
    pub statement: String,
}

/// Shared submission handle; dependents receive a clone at catalog time.
#[derive(Clone)]
pub struct DbPool {
    tx: Sender<QueryRequest>,
    relay: Relay<String>,
}

impl DbPool {
    fn new(queue_depth: usize) -> (Self, Receiver<QueryRequest>) {
        let (tx, rx) = bounded(queue_depth);
        (Self { tx, relay: Relay::new() }, rx)
    }

    /// Submit a statement; the returned ticket is the claim on its reply.
    ///
    /// A full queue fails the ticket immediately rather than letting the
    /// caller burn its whole timeout.
    pub fn submit(
        &self,
        statement: &str,
        timeout: Duration,
    ) -> Result<Ticket<String>, QueryError> {
        let id = Relay::<String>::issue_id("q");
        let ticket = self.relay.register(&id, timeout)?;
        let request =
            QueryRequest { correlation_id: id.clone(), statement: statement.to_string() };
        if self.tx.try_send(request).is_err() {
            self.relay.deliver(&id, Delivery::failure("query queue full"));
        }
        Ok(ticket)
    }

    pub fn wait(&self, ticket: Ticket<String>) -> WaitOutcome<String> {
        self.relay.wait(ticket)
    }

    pub fn relay(&self) -> Relay<String> {
        self.relay.clone()
    }
}

pub struct DatabaseSubsystem {
    enabled: bool,
    workers: i64,
    pool: DbPool,
    rx: Receiver<QueryRequest>,
}

impl DatabaseSubsystem {
    pub fn from_config(config: &Config) -> Self {
        let queue_depth = config.i64_or("database.queue_depth", 64).max(1) as usize;
        let (pool, rx) = DbPool::new(queue_depth);
        Self {
            enabled: config.bool_or("database.enabled", true),
            workers: config.i64_or("database.workers", 2),
            pool,
            rx,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}

impl Subsystem for DatabaseSubsystem {
    fn name(&self) -> &str {
        NAME
    }

    fn readiness(&self, ctx: &ReadinessCtx) -> ReadinessReport {
        let config = if !self.enabled {
            Verdict::no_go("disabled by configuration")
        } else if !(1..=MAX_WORKERS).contains(&self.workers) {
            Verdict::no_go(format!(
                "database.workers = {} outside 1..={MAX_WORKERS}",
                self.workers
            ))
        } else {
            Verdict::go(format!("{} worker(s) configured", self.workers))
        };
        ReportBuilder::new(NAME)
            .system_from(&ctx.process)
            .config(config)
            .state(Verdict::go("stub engine loaded"))
            .build()
    }

    fn init(&mut self, ctx: &SubsystemCtx) -> Result<(), SubsystemError> {
        for i in 0..self.workers {
            let rx = self.rx.clone();
            let relay = self.pool.relay();
            let shutdown = ctx.shutdown.clone();
            let log = ctx.log.clone();
            ctx.threads.spawn(&format!("pool-{i}"), move || {
                worker_loop(rx, relay, shutdown, log);
            })?;
        }
        ctx.log.state(format!("pool up with {} worker(s)", self.workers));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SubsystemError> {
        // Workers watch the shutdown flag; nothing to signal beyond it.
        Ok(())
    }
}

fn worker_loop(
    rx: Receiver<QueryRequest>,
    relay: Relay<String>,
    shutdown: ShutdownFlag,
    log: BusHandle,
) {
    loop {
        match rx.recv_timeout(IDLE_WAIT) {
            Ok(request) => {
                let reply = execute(&request.statement);
                if !relay.deliver(&request.correlation_id, reply) {
                    log.debug(format!(
                        "reply for {} had no waiter (late or timed out)",
                        request.correlation_id
                    ));
                }
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

/// Stub execution: enough shape for callers to distinguish success, empty
/// statements and row-less queries.
fn execute(statement: &str) -> Delivery<String> {
    let trimmed = statement.trim();
    if trimmed.is_empty() {
        return Delivery::failure("empty statement");
    }
    let head: SmolStr = trimmed
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
        .into();
    match head.as_str() {
        "select" => Delivery::success("0 rows".to_string()),
        _ => Delivery::success("ok".to_string()),
    }
}

#[cfg(test)]
#[path = "database_tests.rs"]
mod tests;
