// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pending-wait scheduler: resolves `wait_for` requests across
//! frames instead of blocking the dispatcher. Touched only by the main
//! thread, so no synchronization is needed here — unlike [`crate::queues`],
//! which crosses the I/O-thread/main-thread seam.

use std::time::Instant;

use crate::host::{GameHost, NodeRef};
use crate::protocol::{ErrorCode, Response};
use crate::value::Value;

/// Default timeout applied when a `wait_for` request omits `timeout_ms`.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// One outstanding `wait_for` request.
pub struct PendingWait {
    pub id: String,
    pub node: NodeRef,
    pub property: String,
    pub expected: Value,
    pub timeout_ms: u64,
    pub started: Instant,
}

/// Unordered collection of outstanding waits, ticked once per frame.
#[derive(Default)]
pub struct WaitScheduler {
    pending: Vec<PendingWait>,
}

impl WaitScheduler {
    pub fn new() -> Self {
        Self { pending: Vec::new() }
    }

    pub fn push(&mut self, wait: PendingWait) {
        self.pending.push(wait);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Advance every pending wait by one frame against the live host,
    /// returning the responses that resolved this tick.
    ///
    /// A wait resolves in exactly one of three ways: the watched node went
    /// invalid (`not_found`), its stringified value now matches the
    /// expected one (`matched: true`), or the timeout elapsed
    /// (`matched: false`). Everything else stays pending for the next tick.
    pub fn tick(&mut self, host: &dyn GameHost) -> Vec<Response> {
        let mut responses = Vec::new();
        let mut remaining = Vec::with_capacity(self.pending.len());

        for wait in self.pending.drain(..) {
            let Some(current) = host.get_property(wait.node, &wait.property) else {
                responses.push(Response::error(
                    wait.id,
                    ErrorCode::NotFound,
                    "node or property became unavailable while waiting",
                    serde_json::Map::new(),
                ));
                continue;
            };

            if current.to_string() == wait.expected.to_string() {
                let elapsed_ms = wait.started.elapsed().as_millis() as u64;
                let mut data = serde_json::Map::new();
                data.insert("matched".to_owned(), serde_json::Value::Bool(true));
                data.insert("elapsed_ms".to_owned(), serde_json::Value::from(elapsed_ms));
                responses.push(Response::ok(wait.id, data));
                continue;
            }

            let elapsed_ms = wait.started.elapsed().as_millis() as u64;
            if elapsed_ms >= wait.timeout_ms {
                let mut data = serde_json::Map::new();
                data.insert("matched".to_owned(), serde_json::Value::Bool(false));
                data.insert("elapsed_ms".to_owned(), serde_json::Value::from(elapsed_ms));
                data.insert("last_value".to_owned(), current.to_json());
                responses.push(Response::ok(wait.id, data));
                continue;
            }

            remaining.push(wait);
        }

        self.pending = remaining;
        responses
    }
}

#[cfg(test)]
#[path = "waits_tests.rs"]
mod tests;
