// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The launch sequencer.
//!
//! Drives the full startup pass deterministically: readiness check, state
//! transitions and deadline-bounded `init` for every subsystem in topo
//! order. The pass never aborts early; a subsystem that cannot start is
//! left Inactive or Error and the rest continue.

use crate::context::{CoreCtx, SubsystemCtx};
use crate::hooks::{run_init, HookOutcome};
use crate::readiness::{ReadinessCtx, ReadinessReport};
use crate::registry::{SubState, SubsystemRegistry};
use smol_str::SmolStr;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

const LAUNCH_SOURCE: &str = "launch";

#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Budget for each subsystem's `init`.
    pub init_deadline: Duration,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self { init_deadline: Duration::from_secs(10) }
    }
}

/// Where a subsystem ended up after the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Running,
    Inactive,
    Error,
}

#[derive(Debug, Clone)]
pub struct LaunchOutcome {
    pub name: SmolStr,
    pub disposition: Disposition,
    pub reason: Option<String>,
    pub thread_count: usize,
}

/// The launch review: one outcome per subsystem, in start order.
#[derive(Debug, Clone, Default)]
pub struct LaunchReview {
    pub outcomes: Vec<LaunchOutcome>,
}

impl LaunchReview {
    pub fn running(&self) -> usize {
        self.count(Disposition::Running)
    }

    pub fn errored(&self) -> usize {
        self.count(Disposition::Error)
    }

    pub fn inactive(&self) -> usize {
        self.count(Disposition::Inactive)
    }

    fn count(&self, disposition: Disposition) -> usize {
        self.outcomes.iter().filter(|o| o.disposition == disposition).count()
    }
}

pub struct Launcher {
    ctx: CoreCtx,
    options: LaunchOptions,
}

impl Launcher {
    pub fn new(ctx: CoreCtx, options: LaunchOptions) -> Self {
        Self { ctx, options }
    }

    /// Run the full startup pass over every registered subsystem.
    pub fn run(&self, registry: &SubsystemRegistry) -> LaunchReview {
        let log = self.ctx.log(LAUNCH_SOURCE);
        self.ctx.process.set_starting();

        let order = registry.topo_order();
        log.state(format!(
            "launch pass over {} subsystem(s): [{}]",
            order.len(),
            order.join(", ")
        ));

        for name in &order {
            self.launch_one(registry, name);
        }

        self.ctx.process.set_running();
        let review = self.review_of(registry);
        log.state(format!(
            "launch review: {} running, {} error, {} inactive",
            review.running(),
            review.errored(),
            review.inactive()
        ));
        for outcome in &review.outcomes {
            let detail = match (&outcome.disposition, &outcome.reason) {
                (Disposition::Running, _) => {
                    format!("Running ({} thread(s))", outcome.thread_count)
                }
                (disposition, Some(reason)) => format!("{disposition:?}: {reason}"),
                (disposition, None) => format!("{disposition:?}"),
            };
            log.state(format!("  {}: {detail}", outcome.name));
        }
        review
    }

    fn launch_one(&self, registry: &SubsystemRegistry, name: &SmolStr) {
        let log = self.ctx.log(LAUNCH_SOURCE);
        let Some((hook, group, shutdown, _deps)) = registry.lifecycle_refs(name) else {
            return;
        };

        // Readiness runs outside every registry lock, against a snapshot of
        // the running set.
        let ready_ctx = ReadinessCtx::new(
            self.ctx.process.clone(),
            self.ctx.config.clone(),
            registry.running_set(),
        );
        let report: Option<ReadinessReport> =
            catch_unwind(AssertUnwindSafe(|| hook.lock().readiness(&ready_ctx))).ok();

        let Some(report) = report else {
            registry.set_reason(name, "readiness check panicked");
            log.error(format!("{name}: readiness check panicked; remains Inactive"));
            return;
        };

        for line in report.lines() {
            log.state(format!("{name}: {line}"));
        }

        if !report.final_go() {
            let reason = report.first_no_go().unwrap_or("no-go").to_string();
            registry.set_reason(name, reason.clone());
            log.state(format!("{name}: No-Go, remains Inactive ({reason})"));
            return;
        }

        registry.set_state(name, SubState::Ready);
        registry.set_state(name, SubState::Starting);

        let sub_ctx = SubsystemCtx {
            log: self.ctx.log(name.as_str()),
            threads: group.clone(),
            shutdown,
            process: self.ctx.process.clone(),
        };
        let started = self.ctx.clock.now_monotonic();
        let outcome = run_init(
            hook,
            sub_ctx,
            &group,
            &format!("{name}.init"),
            self.options.init_deadline,
        );
        let elapsed = self.ctx.clock.now_monotonic().saturating_duration_since(started);

        match outcome {
            HookOutcome::Completed(Ok(())) => {
                registry.set_state(name, SubState::Running);
                log.state(format!(
                    "{name}: Running after {}ms ({} thread(s))",
                    elapsed.as_millis(),
                    group.count()
                ));
            }
            HookOutcome::Completed(Err(err)) => {
                registry.set_state(name, SubState::Error);
                registry.set_reason(name, format!("init failed: {err}"));
                log.error(format!("{name}: init failed: {err}"));
            }
            HookOutcome::Panicked(message) => {
                registry.set_state(name, SubState::Error);
                registry.set_reason(name, format!("init panicked: {message}"));
                log.error(format!("{name}: init panicked: {message}"));
            }
            HookOutcome::DeadlineExceeded => {
                registry.set_state(name, SubState::Error);
                registry.set_reason(
                    name,
                    format!("init exceeded {}ms deadline", self.options.init_deadline.as_millis()),
                );
                log.error(format!(
                    "{name}: init still running after {}ms, marked Error",
                    self.options.init_deadline.as_millis()
                ));
            }
        }
    }

    fn review_of(&self, registry: &SubsystemRegistry) -> LaunchReview {
        let outcomes = registry
            .snapshot(self.ctx.clock.now_monotonic())
            .into_iter()
            .map(|snap| LaunchOutcome {
                name: snap.name,
                disposition: match snap.state {
                    SubState::Running => Disposition::Running,
                    SubState::Error => Disposition::Error,
                    _ => Disposition::Inactive,
                },
                reason: snap.reason,
                thread_count: snap.thread_count,
            })
            .collect();
        LaunchReview { outcomes }
    }
}

#[cfg(test)]
#[path = "launch_tests.rs"]
mod tests;
