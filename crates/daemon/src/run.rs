// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process entry: build the context in initialization order, launch, wait
//! for signals, land, exit.

use crate::config::DaemonConfig;
use crate::pidlock::PidLock;
use crate::signals::{SignalEvent, SignalMonitor};
use crate::subsystems;
use crate::watchdog::Watchdog;
use clap::Parser;
use hy_core::{Clock, Level, ProcessState, SystemClock};
use hy_engine::{
    CoreCtx, ExitStatus, Lander, LandingOptions, Launcher, LaunchOptions, SubsystemRegistry,
};
use hy_logbus::{init_facade, BusHandle, ConsoleSink, FileSink, LogBusBuilder};
use hy_threads::ThreadRegistry;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "hyd", about = "Hydrogen multi-subsystem daemon", version)]
pub struct Args {
    /// Path to hydrogen.toml
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the state directory
    #[arg(long)]
    pub state_dir: Option<PathBuf>,

    /// Whole-landing deadline in seconds before the watchdog forces exit
    #[arg(long, default_value_t = 30)]
    pub landing_deadline: u64,
}

/// Run the daemon to completion and return the process exit code.
pub fn run(args: Args) -> i32 {
    // Until the bus is up, failures can only reach stderr; that is the one
    // path that exits with code 3.
    let config = match DaemonConfig::load(args.config.as_deref(), args.state_dir.clone()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("hyd: {err}");
            return ExitStatus::EarlyFatal.code();
        }
    };

    let threads = ThreadRegistry::new();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let mut builder = LogBusBuilder::new().queue_capacity(config.logging.queue_capacity);
    if config.logging.console_enabled {
        builder = builder.sink(Box::new(ConsoleSink), config.logging.console_level);
    }
    if config.logging.file_enabled {
        match FileSink::open(&config.logging.file_path, config.logging.file_max_bytes) {
            Ok(sink) => builder = builder.sink(Box::new(sink), config.logging.file_level),
            Err(err) => {
                eprintln!("hyd: cannot open log file {}: {err}", config.logging.file_path.display());
                return ExitStatus::EarlyFatal.code();
            }
        }
    }
    let bus = match builder.start(Arc::clone(&clock), &threads) {
        Ok(bus) => bus,
        Err(err) => {
            eprintln!("hyd: cannot start log bus: {err}");
            return ExitStatus::EarlyFatal.code();
        }
    };
    let _ = init_facade(bus.clone());
    for entry in &config.logging.overrides {
        bus.set_level(&entry.sink, &entry.source, entry.level);
    }

    let log = BusHandle::new(bus.clone(), "hyd");
    for key in &config.unknown_keys {
        log.alert(format!("unknown configuration key '{key}'"));
    }

    let pidlock = match PidLock::acquire(&config.lock_path) {
        Ok(lock) => lock,
        Err(err) => {
            log.fatal(format!("{err}"));
            bus.shutdown(Duration::from_secs(2));
            return ExitStatus::SubsystemErrors.code();
        }
    };

    let ctx = CoreCtx {
        clock,
        process: Arc::new(ProcessState::new()),
        config: config.tree.clone(),
        bus: bus.clone(),
        threads: threads.clone(),
    };
    let registry = SubsystemRegistry::new(ctx.log("registry"));
    let waiters = match subsystems::register_builtins(&registry, &threads, &config.tree) {
        Ok(waiters) => waiters,
        Err(err) => {
            log.fatal(format!("catalog registration failed: {err}"));
            bus.shutdown(Duration::from_secs(2));
            pidlock.release();
            return ExitStatus::SubsystemErrors.code();
        }
    };

    Launcher::new(ctx.clone(), LaunchOptions::default()).run(&registry);

    let monitor = match SignalMonitor::start() {
        Ok(monitor) => monitor,
        Err(err) => {
            // Without signal delivery the daemon could never land; go down
            // now, cleanly.
            log.error(format!("{err}; shutting down"));
            let review = Lander::new(ctx, LandingOptions::default()).run(&registry, &waiters);
            pidlock.release();
            return review.exit.code();
        }
    };

    log.state("hydrogen up");
    loop {
        match monitor.events().recv() {
            Ok(SignalEvent::Rotate) => {
                log.state("SIGHUP received; reopening file sinks");
                bus.reopen_sinks();
            }
            Ok(SignalEvent::Terminate) => {
                log.state("termination signal received; beginning landing");
                break;
            }
            Err(_) => break,
        }
    }

    let watchdog = {
        let term_counter = monitor.term_counter();
        let bus = bus.clone();
        let threads = threads.clone();
        Watchdog::arm(
            Duration::from_secs(args.landing_deadline),
            move || term_counter.load(Ordering::Acquire) >= 2,
            move || {
                // Synchronous Fatal write: this must hit the sinks even
                // though the process dies on the next line.
                bus.log(
                    "watchdog",
                    Level::Fatal,
                    format!(
                        "forced exit; surviving threads: [{}]",
                        threads.live_labels().join(", ")
                    ),
                );
                std::process::exit(ExitStatus::WatchdogForced.code());
            },
        )
    };

    let review = Lander::new(ctx, LandingOptions::default()).run(&registry, &waiters);

    if let Ok(watchdog) = watchdog {
        watchdog.disarm();
    }
    monitor.stop();
    pidlock.release();

    if review.final_thread_count != 1 {
        eprintln!(
            "hyd: {} thread(s) still registered at exit",
            review.final_thread_count - 1
        );
    }
    review.exit.code()
}
