// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use hy_core::{ProcessState, ShutdownFlag, SystemClock};
use hy_logbus::{BusHandle, LogBusBuilder};
use hy_threads::{JoinOutcome, ThreadRegistry};
use std::io::Read;
use std::net::TcpStream;
use std::sync::Arc;

fn ctx() -> (SubsystemCtx, ThreadRegistry) {
    let threads = ThreadRegistry::new();
    let bus = LogBusBuilder::new()
        .start(Arc::new(SystemClock), &threads)
        .unwrap();
    let group = threads.create_group(NAME);
    (
        SubsystemCtx {
            log: BusHandle::new(bus, NAME),
            threads: group,
            shutdown: ShutdownFlag::new(),
            process: Arc::new(ProcessState::new()),
        },
        threads,
    )
}

fn config_for_port(port: u16) -> Config {
    Config::from_str(&format!("[webserver]\nbind = \"127.0.0.1\"\nport = {port}")).unwrap()
}

/// Grab a free port by binding to 0 and releasing it.
fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[test]
fn serves_the_health_response_until_shut_down() {
    let port = free_port();
    let (ctx, _threads) = ctx();
    let mut server = WebServerSubsystem::from_config(&config_for_port(port));
    server.init(&ctx).unwrap();

    let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();
    assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
    assert!(response.ends_with("hydrogen alive\n"), "{response}");

    ctx.shutdown.signal();
    assert_eq!(ctx.threads.join_all(Duration::from_secs(2)), JoinOutcome::AllJoined);
}

#[test]
fn init_fails_when_the_port_is_taken() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let (ctx, _threads) = ctx();
    let mut server = WebServerSubsystem::from_config(&config_for_port(port));
    let err = server.init(&ctx).unwrap_err();
    assert!(err.to_string().contains("bind"), "{err}");
}

#[test]
fn readiness_probes_the_port_without_reserving_it() {
    let port = free_port();
    let server = WebServerSubsystem::from_config(&config_for_port(port));
    let ready_ctx = ReadinessCtx::new(
        Arc::new(ProcessState::new()),
        Config::empty(),
        ["database"].iter().map(|s| SmolStr::new(s)).collect(),
    );
    let report = server.readiness(&ready_ctx);
    assert!(report.resources.go, "{:?}", report.resources);
    // The probe must not still hold the port.
    let _rebind = TcpListener::bind(("127.0.0.1", port)).unwrap();
}

#[test]
fn readiness_fails_without_the_database_dependency() {
    let port = free_port();
    let server = WebServerSubsystem::from_config(&config_for_port(port));
    let ready_ctx = ReadinessCtx::new(
        Arc::new(ProcessState::new()),
        Config::empty(),
        Default::default(),
    );
    let report = server.readiness(&ready_ctx);
    assert_eq!(report.first_no_go(), Some("dependency 'database' not Running"));
}

#[test]
fn out_of_range_port_is_a_config_no_go() {
    let tree = Config::from_str("[webserver]\nport = 0").unwrap();
    let server = WebServerSubsystem::from_config(&tree);
    let ready_ctx = ReadinessCtx::new(
        Arc::new(ProcessState::new()),
        Config::empty(),
        ["database"].iter().map(|s| SmolStr::new(s)).collect(),
    );
    let report = server.readiness(&ready_ctx);
    assert!(report.first_no_go().unwrap_or_default().contains("out of range"));
}
