// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn ctx_running(names: &[&str]) -> ReadinessCtx {
    ReadinessCtx::new(
        Arc::new(ProcessState::new()),
        Config::empty(),
        names.iter().map(|n| SmolStr::new(n)).collect(),
    )
}

#[test]
fn all_go_by_default() {
    let report = ReportBuilder::new("webserver").build();
    assert!(report.final_go());
    assert_eq!(report.first_no_go(), None);
}

#[test]
fn one_failing_verdict_fails_the_report() {
    let report = ReportBuilder::new("webserver")
        .resources(Verdict::no_go("port 8080 in use"))
        .build();
    assert!(!report.final_go());
    assert_eq!(report.first_no_go(), Some("port 8080 in use"));
}

#[test]
fn lines_follow_the_check_order_with_go_tags() {
    let report = ReportBuilder::new("webserver")
        .config(Verdict::no_go("missing key 'webserver.port'"))
        .build();
    let lines = report.lines();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("Go: system: "), "{}", lines[0]);
    assert_eq!(lines[1], "No-Go: config: missing key 'webserver.port'");
    assert!(lines[2].starts_with("Go: resources: "));
    assert!(lines[3].starts_with("Go: state: "));
    assert!(lines[4].starts_with("Go: deps: "));
}

#[test]
fn first_no_go_respects_fast_fail_order() {
    let report = ReportBuilder::new("db")
        .config(Verdict::no_go("config bad"))
        .deps(Verdict::no_go("deps bad"))
        .build();
    assert_eq!(report.first_no_go(), Some("config bad"));
}

#[test]
fn system_verdict_fails_while_stopping() {
    let process = ProcessState::new();
    process.set_stopping();
    let report = ReportBuilder::new("mdns").system_from(&process).build();
    assert!(!report.system.go);
    assert_eq!(report.first_no_go(), Some("process is shutting down"));
}

#[test]
fn system_verdict_fails_after_fatal() {
    let process = ProcessState::new();
    process.set_fatal();
    let report = ReportBuilder::new("mdns").system_from(&process).build();
    assert_eq!(report.first_no_go(), Some("fatal condition observed"));
}

#[test]
fn deps_verdict_names_the_first_missing_dependency() {
    let ctx = ctx_running(&["log"]);
    let deps = vec![SmolStr::new("log"), SmolStr::new("threads")];
    let report = ReportBuilder::new("net").deps_from(&deps, &ctx).build();
    assert!(!report.deps.go);
    assert_eq!(report.deps.detail, "dependency 'threads' not Running");
}

#[test]
fn deps_verdict_passes_when_all_running() {
    let ctx = ctx_running(&["log", "threads"]);
    let deps = vec![SmolStr::new("log"), SmolStr::new("threads")];
    let report = ReportBuilder::new("net").deps_from(&deps, &ctx).build();
    assert!(report.deps.go);
    assert_eq!(report.deps.detail, "all 2 dependencies Running");
}
