// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hy-relay: pending-result correlation.
//!
//! Ties a request submitted to an asynchronous worker pool back to the caller
//! waiting for its result. The database subsystem uses this to let a request
//! handler submit a query to the pool and block on the reply; any
//! request/response subsystem can do the same.

pub mod relay;

pub use relay::{CancelWaiters, Delivery, RegisterError, Relay, Ticket, WaitOutcome};
