// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured go/no-go readiness reports.
//!
//! Each subsystem reduces "can I start safely right now?" to five
//! independent verdicts, checked cheapest-first: system state,
//! configuration, resources, the subsystem's own state, and declared
//! dependencies. The final go is the conjunction; every verdict carries
//! exactly one diagnostic line.

use hy_core::{Config, ProcessState};
use smol_str::SmolStr;
use std::collections::HashSet;
use std::sync::Arc;

/// What a readiness check may look at. Snapshotted by the launch sequencer
/// per subsystem, so checks run without holding any registry lock.
pub struct ReadinessCtx {
    pub process: Arc<ProcessState>,
    pub config: Config,
    running: HashSet<SmolStr>,
}

impl ReadinessCtx {
    pub fn new(process: Arc<ProcessState>, config: Config, running: HashSet<SmolStr>) -> Self {
        Self { process, config, running }
    }

    /// Whether a subsystem is currently in the Running state.
    pub fn is_running(&self, name: &str) -> bool {
        self.running.contains(name)
    }
}

/// One check's outcome plus its human-readable detail. No secrets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub go: bool,
    pub detail: String,
}

impl Verdict {
    pub fn go(detail: impl Into<String>) -> Self {
        Self { go: true, detail: detail.into() }
    }

    pub fn no_go(detail: impl Into<String>) -> Self {
        Self { go: false, detail: detail.into() }
    }
}

/// The five-verdict report, one per subsystem per launch attempt.
#[derive(Debug, Clone)]
pub struct ReadinessReport {
    pub subsystem: SmolStr,
    /// Process is not shutting down and no fatal has been observed.
    pub system: Verdict,
    /// Required configuration keys present and within range.
    pub config: Verdict,
    /// Ports, paths, descriptors, memory.
    pub resources: Verdict,
    /// The subsystem-specific check (payload markers, key files, driver
    /// versions, own lifecycle state).
    pub state: Verdict,
    /// Every declared dependency is Running.
    pub deps: Verdict,
}

impl ReadinessReport {
    pub fn final_go(&self) -> bool {
        self.system.go && self.config.go && self.resources.go && self.state.go && self.deps.go
    }

    /// Diagnostic lines in check order, `{Go|No-Go}: <check>: <detail>`.
    pub fn lines(&self) -> Vec<String> {
        [
            ("system", &self.system),
            ("config", &self.config),
            ("resources", &self.resources),
            ("state", &self.state),
            ("deps", &self.deps),
        ]
        .iter()
        .map(|(check, verdict)| {
            let tag = if verdict.go { "Go" } else { "No-Go" };
            format!("{tag}: {check}: {}", verdict.detail)
        })
        .collect()
    }

    /// Detail of the first failing check, for the recorded no-go reason.
    pub fn first_no_go(&self) -> Option<&str> {
        [&self.system, &self.config, &self.resources, &self.state, &self.deps]
            .into_iter()
            .find(|verdict| !verdict.go)
            .map(|verdict| verdict.detail.as_str())
    }
}

/// Builds a report with every verdict defaulting to go.
///
/// Subsystems overwrite the checks that apply to them; a check with nothing
/// to examine stays a go with a neutral detail line.
pub struct ReportBuilder {
    report: ReadinessReport,
}

impl ReportBuilder {
    pub fn new(subsystem: &str) -> Self {
        Self {
            report: ReadinessReport {
                subsystem: SmolStr::new(subsystem),
                system: Verdict::go("nothing to check"),
                config: Verdict::go("nothing to check"),
                resources: Verdict::go("nothing to check"),
                state: Verdict::go("nothing to check"),
                deps: Verdict::go("no dependencies"),
            },
        }
    }

    /// Standard system-state verdict from the process flags.
    pub fn system_from(mut self, process: &ProcessState) -> Self {
        self.report.system = if process.is_stopping() {
            Verdict::no_go("process is shutting down")
        } else if process.is_fatal() {
            Verdict::no_go("fatal condition observed")
        } else {
            Verdict::go("process healthy")
        };
        self
    }

    /// Standard dependency verdict against the running set.
    pub fn deps_from(mut self, deps: &[SmolStr], ctx: &ReadinessCtx) -> Self {
        self.report.deps = match deps.iter().find(|dep| !ctx.is_running(dep)) {
            Some(missing) => Verdict::no_go(format!("dependency '{missing}' not Running")),
            None if deps.is_empty() => Verdict::go("no dependencies"),
            None => Verdict::go(format!("all {} dependencies Running", deps.len())),
        };
        self
    }

    pub fn system(mut self, verdict: Verdict) -> Self {
        self.report.system = verdict;
        self
    }

    pub fn config(mut self, verdict: Verdict) -> Self {
        self.report.config = verdict;
        self
    }

    pub fn resources(mut self, verdict: Verdict) -> Self {
        self.report.resources = verdict;
        self
    }

    pub fn state(mut self, verdict: Verdict) -> Self {
        self.report.state = verdict;
        self
    }

    pub fn deps(mut self, verdict: Verdict) -> Self {
        self.report.deps = verdict;
        self
    }

    pub fn build(self) -> ReadinessReport {
        self.report
    }
}

#[cfg(test)]
#[path = "readiness_tests.rs"]
mod tests;
