// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The build-time subsystem catalog.
//!
//! These are thin collaborators demonstrating the plug-in contract; their
//! internal protocol logic (HTTP parsing, mDNS record encoding, SQL) lives
//! elsewhere. The order of registration here defines the topo tie-break
//! order, so it is fixed.

pub mod database;
pub mod mdns;
pub mod printqueue;
pub mod webserver;

pub use database::{DatabaseSubsystem, DbPool};
pub use mdns::MdnsSubsystem;
pub use printqueue::{PrintJob, PrintQueue, PrintQueueSubsystem};
pub use webserver::WebServerSubsystem;

use hy_core::Config;
use hy_engine::{RegistryError, SubsystemRegistry};
use hy_relay::CancelWaiters;
use hy_threads::ThreadRegistry;
use std::sync::Arc;

/// Register every built-in subsystem and return the relays whose waiters
/// landing must cancel.
pub fn register_builtins(
    registry: &SubsystemRegistry,
    threads: &ThreadRegistry,
    config: &Config,
) -> Result<Vec<Arc<dyn CancelWaiters>>, RegistryError> {
    let database = DatabaseSubsystem::from_config(config);
    let pool = database.pool();

    registry.add(Box::new(database), threads)?;
    registry.add(Box::new(WebServerSubsystem::from_config(config)), threads)?;
    registry.add(Box::new(PrintQueueSubsystem::from_config(config, pool.clone())), threads)?;
    registry.add(Box::new(MdnsSubsystem::from_config(config)), threads)?;

    Ok(vec![Arc::new(pool.relay()) as Arc<dyn CancelWaiters>])
}
