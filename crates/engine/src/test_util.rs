// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scriptable stub subsystems for sequencer tests.

use crate::context::SubsystemCtx;
use crate::readiness::{ReadinessCtx, ReadinessReport, ReportBuilder, Verdict};
use crate::subsystem::{Subsystem, SubsystemError};
use parking_lot::Mutex;
use smol_str::SmolStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Copy)]
pub enum InitBehavior {
    Succeed,
    Fail(&'static str),
    Panic(&'static str),
    HangMs(u64),
}

#[derive(Clone, Copy)]
pub enum StopBehavior {
    Succeed,
    Fail(&'static str),
    HangMs(u64),
}

/// Shared journal of lifecycle events, for order assertions.
#[derive(Clone, Default)]
pub struct EventJournal(Arc<Mutex<Vec<String>>>);

impl EventJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Events of one kind, e.g. every "init:…" entry, in order.
    pub fn of_kind(&self, kind: &str) -> Vec<String> {
        let prefix = format!("{kind}:");
        self.0
            .lock()
            .iter()
            .filter(|e| e.starts_with(&prefix))
            .map(|e| e[prefix.len()..].to_string())
            .collect()
    }
}

/// A subsystem whose whole behavior is scripted by the test.
pub struct StubSubsystem {
    name: &'static str,
    deps: Vec<SmolStr>,
    resources: Verdict,
    init_behavior: InitBehavior,
    stop_behavior: StopBehavior,
    workers: usize,
    workers_obey_shutdown: bool,
    journal: EventJournal,
    /// Escape hatch so disobedient workers still exit when a test ends.
    release: Arc<AtomicBool>,
    shutdown_seen: Option<hy_core::ShutdownFlag>,
}

impl StubSubsystem {
    pub fn new(name: &'static str, journal: EventJournal) -> Self {
        Self {
            name,
            deps: Vec::new(),
            resources: Verdict::go("nothing reserved"),
            init_behavior: InitBehavior::Succeed,
            stop_behavior: StopBehavior::Succeed,
            workers: 0,
            workers_obey_shutdown: true,
            journal,
            release: Arc::new(AtomicBool::new(false)),
            shutdown_seen: None,
        }
    }

    pub fn depends_on(mut self, deps: &[&str]) -> Self {
        self.deps = deps.iter().map(|d| SmolStr::new(d)).collect();
        self
    }

    pub fn resources_no_go(mut self, detail: &str) -> Self {
        self.resources = Verdict::no_go(detail);
        self
    }

    pub fn init(mut self, behavior: InitBehavior) -> Self {
        self.init_behavior = behavior;
        self
    }

    pub fn stop(mut self, behavior: StopBehavior) -> Self {
        self.stop_behavior = behavior;
        self
    }

    pub fn workers(mut self, count: usize) -> Self {
        self.workers = count;
        self
    }

    /// Workers ignore the shutdown flag until [`Self::release_handle`] fires.
    pub fn defiant_workers(mut self, count: usize) -> Self {
        self.workers = count;
        self.workers_obey_shutdown = false;
        self
    }

    pub fn release_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.release)
    }

    pub fn boxed(self) -> Box<dyn Subsystem> {
        Box::new(self)
    }
}

impl Subsystem for StubSubsystem {
    fn name(&self) -> &str {
        self.name
    }

    fn dependencies(&self) -> Vec<SmolStr> {
        self.deps.clone()
    }

    fn readiness(&self, ctx: &ReadinessCtx) -> ReadinessReport {
        self.journal.push(format!("ready:{}", self.name));
        ReportBuilder::new(self.name)
            .system_from(&ctx.process)
            .resources(self.resources.clone())
            .deps_from(&self.deps, ctx)
            .build()
    }

    #[allow(clippy::panic)] // InitBehavior::Panic exists to exercise the catch_unwind boundary
    fn init(&mut self, ctx: &SubsystemCtx) -> Result<(), SubsystemError> {
        self.journal.push(format!("init:{}", self.name));
        self.shutdown_seen = Some(ctx.shutdown.clone());
        match self.init_behavior {
            InitBehavior::Succeed => {}
            InitBehavior::Fail(reason) => return Err(SubsystemError::failed(reason)),
            InitBehavior::Panic(reason) => panic!("{reason}"),
            InitBehavior::HangMs(ms) => std::thread::sleep(Duration::from_millis(ms)),
        }
        for i in 0..self.workers {
            let shutdown = ctx.shutdown.clone();
            let obeys = self.workers_obey_shutdown;
            let release = Arc::clone(&self.release);
            ctx.threads.spawn(&format!("worker-{i}"), move || loop {
                if release.load(Ordering::Acquire) {
                    break;
                }
                if obeys && shutdown.is_signaled() {
                    break;
                }
                std::thread::sleep(Duration::from_millis(5));
            })?;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SubsystemError> {
        self.journal.push(format!("stop:{}", self.name));
        if self.shutdown_seen.as_ref().is_some_and(|flag| flag.is_signaled()) {
            self.journal.push(format!("flag-before-stop:{}", self.name));
        }
        match self.stop_behavior {
            StopBehavior::Succeed => Ok(()),
            StopBehavior::Fail(reason) => Err(SubsystemError::failed(reason)),
            StopBehavior::HangMs(ms) => {
                std::thread::sleep(Duration::from_millis(ms));
                Ok(())
            }
        }
    }
}
