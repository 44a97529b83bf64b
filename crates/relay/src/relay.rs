// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The correlation table.
//!
//! Each registered correlation id owns a slot with its own completion
//! primitive. A `wait` observes exactly one terminal state; a `deliver` that
//! finds no waiting slot (late delivery, unknown id) is a no-op apart from
//! the dropped-delivery counter.

use nanoid::nanoid;
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// A worker's reply: opaque payload, success flag, optional error text.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery<T> {
    pub ok: bool,
    pub payload: Option<T>,
    pub error: Option<String>,
}

impl<T> Delivery<T> {
    pub fn success(payload: T) -> Self {
        Self { ok: true, payload: Some(payload), error: None }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self { ok: false, payload: None, error: Some(error.into()) }
    }
}

/// Terminal outcome of a wait. Exactly one per ticket.
#[derive(Debug, PartialEq)]
pub enum WaitOutcome<T> {
    Delivered(Delivery<T>),
    TimedOut,
    Cancelled,
}

#[derive(Debug, Error, PartialEq)]
pub enum RegisterError {
    #[error("correlation id '{0}' is already registered")]
    Duplicate(String),

    #[error("relay is shutting down")]
    ShuttingDown,
}

#[derive(Debug)]
enum SlotState<T> {
    Waiting,
    Delivered(Delivery<T>),
    Cancelled,
    TimedOut,
}

#[derive(Debug)]
struct Slot<T> {
    state: Mutex<SlotState<T>>,
    ready: Condvar,
}

/// Single-consumer claim on a registered correlation id.
///
/// The deadline is fixed at registration time, so time spent between
/// `register` and `wait` counts against the budget.
#[derive(Debug)]
pub struct Ticket<T> {
    id: String,
    deadline: Instant,
    slot: Arc<Slot<T>>,
}

impl<T> Ticket<T> {
    pub fn id(&self) -> &str {
        &self.id
    }
}

struct Inner<T> {
    slots: Mutex<HashMap<String, Arc<Slot<T>>>>,
    dropped_deliveries: AtomicU64,
    closed: AtomicBool,
}

/// Correlation table shared between request submitters and worker pools.
pub struct Relay<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Relay<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T: Send> Default for Relay<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send> Relay<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                slots: Mutex::new(HashMap::new()),
                dropped_deliveries: AtomicU64::new(0),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Mint a process-unique correlation id with the caller's prefix.
    pub fn issue_id(prefix: &str) -> String {
        format!("{prefix}-{}", nanoid!(10))
    }

    /// Insert a Waiting entry and return the single-consumer ticket for it.
    pub fn register(
        &self,
        correlation_id: &str,
        timeout: Duration,
    ) -> Result<Ticket<T>, RegisterError> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(RegisterError::ShuttingDown);
        }
        let slot = Arc::new(Slot {
            state: Mutex::new(SlotState::Waiting),
            ready: Condvar::new(),
        });
        let mut slots = self.inner.slots.lock();
        if slots.contains_key(correlation_id) {
            return Err(RegisterError::Duplicate(correlation_id.to_string()));
        }
        slots.insert(correlation_id.to_string(), Arc::clone(&slot));
        Ok(Ticket {
            id: correlation_id.to_string(),
            deadline: Instant::now() + timeout,
            slot,
        })
    }

    /// Block until the ticket reaches a terminal state.
    pub fn wait(&self, ticket: Ticket<T>) -> WaitOutcome<T> {
        let mut state = ticket.slot.state.lock();
        loop {
            match &*state {
                SlotState::Waiting => {}
                SlotState::Delivered(_) => {
                    let taken = std::mem::replace(&mut *state, SlotState::TimedOut);
                    drop(state);
                    self.forget(&ticket.id);
                    match taken {
                        SlotState::Delivered(delivery) => return WaitOutcome::Delivered(delivery),
                        // Unreachable: just matched Delivered above.
                        _ => return WaitOutcome::Cancelled,
                    }
                }
                SlotState::Cancelled => {
                    drop(state);
                    self.forget(&ticket.id);
                    return WaitOutcome::Cancelled;
                }
                SlotState::TimedOut => {
                    drop(state);
                    self.forget(&ticket.id);
                    return WaitOutcome::TimedOut;
                }
            }
            if ticket.slot.ready.wait_until(&mut state, ticket.deadline).timed_out() {
                if matches!(&*state, SlotState::Waiting) {
                    *state = SlotState::TimedOut;
                    drop(state);
                    self.forget(&ticket.id);
                    return WaitOutcome::TimedOut;
                }
                // A delivery or cancellation won the race; loop to consume it.
            }
        }
    }

    /// Hand a worker's reply to the waiter, if one is still waiting.
    ///
    /// Late or unmatched deliveries bump the dropped counter and are
    /// otherwise side-effect free. Returns whether a waiter was woken.
    pub fn deliver(&self, correlation_id: &str, delivery: Delivery<T>) -> bool {
        let slot = {
            let slots = self.inner.slots.lock();
            slots.get(correlation_id).cloned()
        };
        let Some(slot) = slot else {
            self.inner.dropped_deliveries.fetch_add(1, Ordering::AcqRel);
            return false;
        };
        let mut state = slot.state.lock();
        match &*state {
            SlotState::Waiting => {
                *state = SlotState::Delivered(delivery);
                slot.ready.notify_one();
                true
            }
            _ => {
                self.inner.dropped_deliveries.fetch_add(1, Ordering::AcqRel);
                false
            }
        }
    }

    /// Wake every waiter with `Cancelled` and refuse new registrations.
    ///
    /// Used once, during shutdown.
    pub fn cancel_all(&self) {
        self.inner.closed.store(true, Ordering::Release);
        let slots: Vec<Arc<Slot<T>>> = {
            let mut map = self.inner.slots.lock();
            map.drain().map(|(_, slot)| slot).collect()
        };
        for slot in slots {
            let mut state = slot.state.lock();
            if matches!(&*state, SlotState::Waiting) {
                *state = SlotState::Cancelled;
                slot.ready.notify_one();
            }
        }
    }

    /// Deliveries that found no waiter (late, duplicate, or unknown id).
    pub fn dropped_deliveries(&self) -> u64 {
        self.inner.dropped_deliveries.load(Ordering::Acquire)
    }

    /// Entries currently waiting, for the landing review.
    pub fn pending_count(&self) -> usize {
        self.inner.slots.lock().len()
    }

    fn forget(&self, correlation_id: &str) {
        self.inner.slots.lock().remove(correlation_id);
    }
}

/// Payload-agnostic view for shutdown code that must cancel every waiter
/// across relays of different payload types.
pub trait CancelWaiters: Send + Sync {
    fn cancel_all(&self);
    fn pending_count(&self) -> usize;
}

impl<T: Send> CancelWaiters for Relay<T> {
    fn cancel_all(&self) {
        Relay::cancel_all(self);
    }

    fn pending_count(&self) -> usize {
        Relay::pending_count(self)
    }
}

#[cfg(test)]
#[path = "relay_tests.rs"]
mod tests;
