// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The mDNS announcer subsystem.
//!
//! Periodically announces the web service on the local network. Record
//! encoding belongs to the mDNS collaborator; this subsystem only owns the
//! socket, the cadence and the lifecycle.

use hy_core::{Config, ShutdownFlag};
use hy_engine::{
    ReadinessCtx, ReadinessReport, ReportBuilder, Subsystem, SubsystemCtx, SubsystemError, Verdict,
};
use smol_str::SmolStr;
use std::net::UdpSocket;
use std::time::{Duration, Instant};

const NAME: &str = "mdns";
const MDNS_GROUP: (&str, u16) = ("224.0.0.251", 5353);

/// Shutdown-flag poll slice inside the announce interval.
const POLL_WAIT: Duration = Duration::from_millis(100);

pub struct MdnsSubsystem {
    enabled: bool,
    service: String,
    interval: Duration,
}

impl MdnsSubsystem {
    pub fn from_config(config: &Config) -> Self {
        Self {
            enabled: config.bool_or("mdns.enabled", true),
            service: config.str_or("mdns.service", "_hydrogen._tcp.local"),
            interval: Duration::from_millis(config.i64_or("mdns.interval_ms", 2000).max(0) as u64),
        }
    }
}

impl Subsystem for MdnsSubsystem {
    fn name(&self) -> &str {
        NAME
    }

    fn dependencies(&self) -> Vec<SmolStr> {
        vec![SmolStr::new("webserver")]
    }

    fn readiness(&self, ctx: &ReadinessCtx) -> ReadinessReport {
        let config = if !self.enabled {
            Verdict::no_go("disabled by configuration")
        } else if self.interval < Duration::from_millis(250) {
            Verdict::no_go(format!("mdns.interval_ms = {}ms too aggressive", self.interval.as_millis()))
        } else {
            Verdict::go(format!("announce '{}' every {}ms", self.service, self.interval.as_millis()))
        };
        ReportBuilder::new(NAME)
            .system_from(&ctx.process)
            .config(config)
            .deps_from(&self.dependencies(), ctx)
            .build()
    }

    fn init(&mut self, ctx: &SubsystemCtx) -> Result<(), SubsystemError> {
        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        let service = self.service.clone();
        let interval = self.interval;
        let shutdown = ctx.shutdown.clone();
        let log = ctx.log.clone();
        ctx.threads.spawn("announcer", move || {
            announce_loop(socket, service, interval, shutdown, log);
        })?;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SubsystemError> {
        Ok(())
    }
}

fn announce_loop(
    socket: UdpSocket,
    service: String,
    interval: Duration,
    shutdown: ShutdownFlag,
    log: hy_logbus::BusHandle,
) {
    let mut next_announce = Instant::now();
    while !shutdown.is_signaled() {
        if Instant::now() >= next_announce {
            // Encoding of the actual record set lives with the mDNS
            // collaborator; announcing presence is all the core owns.
            if let Err(err) = socket.send_to(service.as_bytes(), MDNS_GROUP) {
                log.debug(format!("announce failed: {err}"));
            } else {
                log.trace(format!("announced '{service}'"));
            }
            next_announce = Instant::now() + interval;
        }
        std::thread::sleep(POLL_WAIT);
    }
}

#[cfg(test)]
#[path = "mdns_tests.rs"]
mod tests;
