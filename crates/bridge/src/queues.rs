// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response queues: two independent mutex-guarded
//! FIFOs connecting the I/O worker thread to the host's per-frame tick.
//! Neither side blocks — both poll and proceed, so a stalled peer never
//! wedges the other.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::protocol::ParsedLine;

/// Inbound queue: parsed request envelopes (or parse errors), in the order
/// lines arrived on the wire.
#[derive(Default)]
pub struct InboundQueue {
    items: Mutex<VecDeque<ParsedLine>>,
}

impl InboundQueue {
    pub fn new() -> Self {
        Self { items: Mutex::new(VecDeque::new()) }
    }

    /// Append one parsed line. Called from the I/O thread.
    pub fn push(&self, line: ParsedLine) {
        if let Ok(mut items) = self.items.lock() {
            items.push_back(line);
        }
    }

    /// Drain everything currently queued, oldest first. Called once per
    /// frame from the dispatcher.
    pub fn drain(&self) -> Vec<ParsedLine> {
        let Ok(mut items) = self.items.lock() else { return Vec::new() };
        items.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outbound queue: fully serialized response lines (each already terminated
/// by `\n`), in the order they must be written to the socket.
#[derive(Default)]
pub struct OutboundQueue {
    items: Mutex<VecDeque<String>>,
}

impl OutboundQueue {
    pub fn new() -> Self {
        Self { items: Mutex::new(VecDeque::new()) }
    }

    /// Append one serialized response line. Called from the dispatcher.
    pub fn push(&self, line: String) {
        if let Ok(mut items) = self.items.lock() {
            items.push_back(line);
        }
    }

    /// Drain everything currently queued, oldest first. Called from the I/O
    /// thread immediately before a socket write.
    pub fn drain(&self) -> Vec<String> {
        let Ok(mut items) = self.items.lock() else { return Vec::new() };
        items.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "queues_tests.rs"]
mod tests;
