// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The web server subsystem.
//!
//! Binds its listener in `init` (never in the readiness check, which only
//! probes) and answers every connection with a minimal health response.
//! Request parsing and routing are the HTTP collaborator's concern.

use hy_core::Config;
use hy_engine::{
    ReadinessCtx, ReadinessReport, ReportBuilder, Subsystem, SubsystemCtx, SubsystemError, Verdict,
};
use smol_str::SmolStr;
use std::io::Write;
use std::net::TcpListener;
use std::time::Duration;

const NAME: &str = "webserver";

/// Accept-loop poll interval while the socket is idle.
const ACCEPT_WAIT: Duration = Duration::from_millis(50);

pub struct WebServerSubsystem {
    enabled: bool,
    bind: String,
    port: i64,
}

impl WebServerSubsystem {
    pub fn from_config(config: &Config) -> Self {
        Self {
            enabled: config.bool_or("webserver.enabled", true),
            bind: config.str_or("webserver.bind", "0.0.0.0"),
            port: config.i64_or("webserver.port", 8080),
        }
    }

    fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl Subsystem for WebServerSubsystem {
    fn name(&self) -> &str {
        NAME
    }

    fn dependencies(&self) -> Vec<SmolStr> {
        vec![SmolStr::new("database")]
    }

    fn readiness(&self, ctx: &ReadinessCtx) -> ReadinessReport {
        let config = if !self.enabled {
            Verdict::no_go("disabled by configuration")
        } else if !(1..=65535).contains(&self.port) {
            Verdict::no_go(format!("webserver.port = {} out of range", self.port))
        } else {
            Verdict::go(format!("bind {}", self.addr()))
        };

        // Bind-and-drop probe; the real reservation happens in init, which
        // is why a lost race between the two still has to be survivable.
        let resources = if config.go {
            match TcpListener::bind(self.addr()) {
                Ok(listener) => {
                    drop(listener);
                    Verdict::go(format!("port {} free", self.port))
                }
                Err(err) => Verdict::no_go(format!("port {} unavailable: {err}", self.port)),
            }
        } else {
            Verdict::go("not probed")
        };

        ReportBuilder::new(NAME)
            .system_from(&ctx.process)
            .config(config)
            .resources(resources)
            .deps_from(&self.dependencies(), ctx)
            .build()
    }

    fn init(&mut self, ctx: &SubsystemCtx) -> Result<(), SubsystemError> {
        let listener = TcpListener::bind(self.addr())
            .map_err(|err| SubsystemError::failed(format!("bind {}: {err}", self.addr())))?;
        listener.set_nonblocking(true)?;
        let local = listener.local_addr()?;
        ctx.log.state(format!("listening on {local}"));

        let shutdown = ctx.shutdown.clone();
        let log = ctx.log.clone();
        ctx.threads.spawn("acceptor", move || {
            while !shutdown.is_signaled() {
                match listener.accept() {
                    Ok((stream, peer)) => {
                        log.trace(format!("connection from {peer}"));
                        respond(stream);
                    }
                    Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                        std::thread::sleep(ACCEPT_WAIT);
                    }
                    Err(err) => {
                        log.error(format!("accept failed: {err}"));
                        std::thread::sleep(ACCEPT_WAIT);
                    }
                }
            }
        })?;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SubsystemError> {
        // The acceptor polls the shutdown flag; the listener closes when the
        // acceptor drops it.
        Ok(())
    }
}

fn respond(mut stream: std::net::TcpStream) {
    const BODY: &str = "hydrogen alive\n";
    let _ = stream.set_write_timeout(Some(Duration::from_secs(1)));
    let _ = write!(
        stream,
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        BODY.len(),
        BODY
    );
}

#[cfg(test)]
#[path = "webserver_tests.rs"]
mod tests;
