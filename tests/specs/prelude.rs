// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for the scenario specs.

#![allow(dead_code)]

pub use hy_core::{Config, Level, ProcessState, SystemClock};
pub use hy_engine::test_util::{EventJournal, InitBehavior, StopBehavior, StubSubsystem};
pub use hy_engine::{
    CoreCtx, ExitStatus, Lander, LandingOptions, LandingReview, Launcher, LaunchOptions,
    LaunchReview, SubState, SubsystemRegistry,
};
pub use hy_logbus::test_util::{CaptureSink, Captured};
pub use hy_logbus::{BusHandle, LogBusBuilder};
pub use hy_threads::ThreadRegistry;
pub use std::sync::Arc;
pub use std::time::Duration;

/// A fully wired core: bus with a capture sink, thread registry, subsystem
/// registry, and a journal the stub subsystems append to.
pub struct World {
    pub ctx: CoreCtx,
    pub registry: SubsystemRegistry,
    pub out: Captured,
    pub journal: EventJournal,
}

impl World {
    pub fn new() -> Self {
        let threads = ThreadRegistry::new();
        let (sink, out) = CaptureSink::new("console");
        let bus = LogBusBuilder::new()
            .sink(Box::new(sink), Level::Trace)
            .start(Arc::new(SystemClock), &threads)
            .expect("bus starts");
        let registry = SubsystemRegistry::new(BusHandle::new(bus.clone(), "registry"));
        let ctx = CoreCtx {
            clock: Arc::new(SystemClock),
            process: Arc::new(ProcessState::new()),
            config: Config::empty(),
            bus,
            threads,
        };
        Self { ctx, registry, out, journal: EventJournal::new() }
    }

    pub fn stub(&self, name: &'static str) -> StubSubsystem {
        StubSubsystem::new(name, self.journal.clone())
    }

    pub fn add(&self, subsystem: StubSubsystem) {
        self.registry
            .add(subsystem.boxed(), &self.ctx.threads)
            .expect("subsystem registers");
    }

    pub fn launch(&self) -> LaunchReview {
        Launcher::new(self.ctx.clone(), LaunchOptions::default()).run(&self.registry)
    }

    pub fn land(&self) -> LandingReview {
        Lander::new(self.ctx.clone(), LandingOptions::default()).run(&self.registry, &[])
    }

    pub fn land_with(&self, options: LandingOptions) -> LandingReview {
        Lander::new(self.ctx.clone(), options).run(&self.registry, &[])
    }
}
