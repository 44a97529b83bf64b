// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bridge from the `log` crate facade onto the bus.
//!
//! Third-party crates log through `log::…!`; those records land on the bus
//! under the `ext` source with the crate's target folded into the message.

use crate::bus::LogBus;
use hy_core::Level;

const EXT_SOURCE: &str = "ext";

struct FacadeBridge {
    bus: LogBus,
}

fn map_level(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Alert,
        log::Level::Info => Level::State,
        log::Level::Debug => Level::Debug,
        log::Level::Trace => Level::Trace,
    }
}

impl log::Log for FacadeBridge {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        self.bus.log(
            EXT_SOURCE,
            map_level(record.level()),
            format!("{}: {}", record.target(), record.args()),
        );
    }

    fn flush(&self) {}
}

/// Install the bus as the process-wide `log` backend.
///
/// Can only succeed once per process; a second call reports the facade's
/// already-set error.
pub fn init_facade(bus: LogBus) -> Result<(), log::SetLoggerError> {
    log::set_boxed_logger(Box::new(FacadeBridge { bus }))?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
