// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The landing sequencer.
//!
//! Tears subsystems down in the exact reverse of the launch order, each
//! bounded by a deadline. One misbehaving subsystem never blocks the rest:
//! it is marked Error, its surviving threads are named at Alert, and the
//! pass moves on. The sequencer's only hammer is the deadline; it never
//! force-terminates a thread.

use crate::context::CoreCtx;
use crate::hooks::{run_stop, HookOutcome};
use crate::registry::{SubState, SubsystemRegistry};
use hy_relay::CancelWaiters;
use smol_str::SmolStr;
use std::sync::Arc;
use std::time::Duration;

const LANDING_SOURCE: &str = "landing";

/// Threads belonging to the log bus itself; excluded from the leak check
/// that runs while the bus is still up.
const LOGGING_GROUP_PREFIX: &str = "logging/";

#[derive(Debug, Clone)]
pub struct LandingOptions {
    /// Budget for each subsystem's `stop` hook, and again for joining its
    /// thread group.
    pub stop_deadline: Duration,
    /// Budget for the final log bus drain.
    pub flush_deadline: Duration,
}

impl Default for LandingOptions {
    fn default() -> Self {
        Self {
            stop_deadline: Duration::from_secs(5),
            flush_deadline: Duration::from_secs(2),
        }
    }
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Every subsystem reached Inactive.
    Clean,
    /// At least one subsystem ended in Error.
    SubsystemErrors,
    /// The watchdog forced the exit (landing deadline exceeded).
    WatchdogForced,
    /// Fatal before the log bus was usable.
    EarlyFatal,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Clean => 0,
            ExitStatus::SubsystemErrors => 1,
            ExitStatus::WatchdogForced => 2,
            ExitStatus::EarlyFatal => 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LandingOutcome {
    pub name: SmolStr,
    pub clean: bool,
    pub reason: Option<String>,
    /// Labels of threads that outlived the deadline.
    pub survivors: Vec<String>,
    pub elapsed: Duration,
}

/// The landing review: one outcome per stopped subsystem, in stop order.
#[derive(Debug, Clone)]
pub struct LandingReview {
    pub outcomes: Vec<LandingOutcome>,
    /// Non-logging threads still alive after the pass.
    pub leaked_threads: Vec<String>,
    /// Process-wide thread count after the bus shut down; 1 when clean.
    pub final_thread_count: usize,
    pub bus_drained: bool,
    pub exit: ExitStatus,
}

pub struct Lander {
    ctx: CoreCtx,
    options: LandingOptions,
}

impl Lander {
    pub fn new(ctx: CoreCtx, options: LandingOptions) -> Self {
        Self { ctx, options }
    }

    /// Run the full teardown pass. Flushes and stops the log bus last, so
    /// the returned review is the only witness after this call.
    pub fn run(
        &self,
        registry: &SubsystemRegistry,
        waiters: &[Arc<dyn CancelWaiters>],
    ) -> LandingReview {
        let log = self.ctx.log(LANDING_SOURCE);
        self.ctx.process.set_stopping();

        let mut order = registry.topo_order();
        order.reverse();
        log.state(format!("landing pass, stop order: [{}]", order.join(", ")));

        // Every shutdown flag goes up before any stop hook runs, so a
        // subsystem observes its own flag no matter where it is in the
        // order.
        for name in &order {
            if let Some((_, _, shutdown, _)) = registry.lifecycle_refs(name) {
                shutdown.signal();
            }
        }

        let mut outcomes = Vec::new();
        for name in &order {
            if registry.state(name.as_str()) != Some(SubState::Running) {
                continue;
            }
            outcomes.push(self.stop_one(registry, name));
        }

        let mut cancelled = 0;
        for waiter in waiters {
            cancelled += waiter.pending_count();
            waiter.cancel_all();
        }
        if cancelled > 0 {
            log.state(format!("cancelled {cancelled} pending-result waiter(s)"));
        }

        // Leak check while the bus can still carry the alert. The bus's own
        // drain threads are excluded here and verified after shutdown.
        let leaked_threads: Vec<String> = self
            .ctx
            .threads
            .live_labels()
            .into_iter()
            .filter(|label| !label.starts_with(LOGGING_GROUP_PREFIX))
            .collect();
        if !leaked_threads.is_empty() {
            log.alert(format!(
                "{} thread(s) survived landing: [{}]",
                leaked_threads.len(),
                leaked_threads.join(", ")
            ));
        }

        let errored = registry
            .snapshot(self.ctx.clock.now_monotonic())
            .iter()
            .filter(|snap| snap.state == SubState::Error)
            .count();
        let clean_stops = outcomes.iter().filter(|o| o.clean).count();
        log.state(format!(
            "landing review: {} stopped clean, {} error, {} waiter(s) cancelled",
            clean_stops, errored, cancelled
        ));
        for outcome in &outcomes {
            let detail = if outcome.clean {
                format!("stopped in {}ms", outcome.elapsed.as_millis())
            } else {
                format!(
                    "{} (survivors: [{}])",
                    outcome.reason.as_deref().unwrap_or("stop failed"),
                    outcome.survivors.join(", ")
                )
            };
            log.state(format!("  {}: {detail}", outcome.name));
        }

        let bus_drained = self.ctx.bus.shutdown(self.options.flush_deadline);
        let final_thread_count = self.ctx.threads.count_total();

        let exit = if errored > 0 {
            ExitStatus::SubsystemErrors
        } else {
            ExitStatus::Clean
        };

        LandingReview { outcomes, leaked_threads, final_thread_count, bus_drained, exit }
    }

    fn stop_one(&self, registry: &SubsystemRegistry, name: &SmolStr) -> LandingOutcome {
        let log = self.ctx.log(LANDING_SOURCE);
        let started = self.ctx.clock.now_monotonic();
        let Some((hook, group, _shutdown, _deps)) = registry.lifecycle_refs(name) else {
            return LandingOutcome {
                name: name.clone(),
                clean: false,
                reason: Some("record vanished mid-landing".to_string()),
                survivors: Vec::new(),
                elapsed: Duration::ZERO,
            };
        };

        registry.set_state(name, SubState::Stopping);
        let threads_before = group.count();

        let stop_result = run_stop(
            hook,
            &group,
            &format!("{name}.stop"),
            self.options.stop_deadline,
        );
        let stop_reason = match stop_result {
            HookOutcome::Completed(Ok(())) => None,
            HookOutcome::Completed(Err(err)) => Some(format!("stop failed: {err}")),
            HookOutcome::Panicked(message) => Some(format!("stop panicked: {message}")),
            HookOutcome::DeadlineExceeded => Some(format!(
                "stop exceeded {}ms deadline",
                self.options.stop_deadline.as_millis()
            )),
        };

        let join_outcome = group.join_all(self.options.stop_deadline);
        let elapsed = self.ctx.clock.now_monotonic().saturating_duration_since(started);

        match (stop_reason, join_outcome) {
            (None, hy_threads::JoinOutcome::AllJoined) => {
                registry.set_state(name, SubState::Inactive);
                log.state(format!(
                    "{name}: stopped in {}ms, thread delta {} -> 0",
                    elapsed.as_millis(),
                    threads_before
                ));
                LandingOutcome {
                    name: name.clone(),
                    clean: true,
                    reason: None,
                    survivors: Vec::new(),
                    elapsed,
                }
            }
            (reason, join_outcome) => {
                let survivors = match join_outcome {
                    hy_threads::JoinOutcome::Timeout { remaining } => remaining,
                    hy_threads::JoinOutcome::AllJoined => Vec::new(),
                };
                let reason = reason.unwrap_or_else(|| {
                    format!("{} thread(s) failed to exit in time", survivors.len())
                });
                registry.set_state(name, SubState::Error);
                registry.set_reason(name, reason.clone());
                log.alert(format!(
                    "{name}: {reason}; surviving threads: [{}]",
                    survivors.join(", ")
                ));
                LandingOutcome {
                    name: name.clone(),
                    clean: false,
                    reason: Some(reason),
                    survivors,
                    elapsed,
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "landing_tests.rs"]
mod tests;
