// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Diagnostic ring buffer fed by a [`tracing_subscriber::Layer`]
//! and by direct engine-diagnostic reports (script/shader errors, explicit
//! messages) that never go through `tracing` at all.
//!
//! Unlike the file-backed append-only log used elsewhere for catchup,
//! diagnostics live entirely in memory: a fixed-capacity ring with a
//! monotonically increasing index, so `get_errors(since_index)` can poll
//! incrementally without ever re-reading an entry twice.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde::Serialize;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// Maximum number of entries retained; oldest entries are evicted first.
pub const CAPACITY: usize = 500;

/// Severity/category recorded alongside a diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    Error,
    Warning,
    Script,
    Shader,
    Message,
}

/// One captured diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticEntry {
    pub index: u64,
    pub kind: DiagnosticKind,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub function: Option<String>,
    pub code: Option<String>,
    pub rationale: String,
    pub timestamp_ms: u64,
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

struct Inner {
    entries: VecDeque<DiagnosticEntry>,
    next_index: u64,
    error_count: u64,
    warning_count: u64,
}

/// Shared diagnostic sink, installed both as a [`tracing_subscriber::Layer`]
/// (for plain `error!`/`warn!` events) and as the backing store the host
/// capability layer reports script errors, shader errors, and explicit
/// messages into directly.
pub struct DiagnosticRing {
    inner: Mutex<Inner>,
}

/// Fields describing one diagnostic, independent of how it was captured.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticFields {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub function: Option<String>,
    pub code: Option<String>,
}

impl DiagnosticRing {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: VecDeque::new(),
                next_index: 0,
                error_count: 0,
                warning_count: 0,
            }),
        }
    }

    /// Record one diagnostic of any kind. Used directly by the script/shader
    /// reporting paths, and indirectly (via the `Layer` impl) for
    /// `tracing`-emitted error/warning events.
    pub fn record(&self, kind: DiagnosticKind, rationale: impl Into<String>, fields: DiagnosticFields) {
        let Ok(mut inner) = self.inner.lock() else { return };
        let index = inner.next_index;
        inner.next_index += 1;
        match kind {
            DiagnosticKind::Error => inner.error_count += 1,
            DiagnosticKind::Warning => inner.warning_count += 1,
            DiagnosticKind::Script | DiagnosticKind::Shader | DiagnosticKind::Message => {}
        }
        inner.entries.push_back(DiagnosticEntry {
            index,
            kind,
            file: fields.file,
            line: fields.line,
            function: fields.function,
            code: fields.code,
            rationale: rationale.into(),
            timestamp_ms: now_ms(),
        });
        if inner.entries.len() > CAPACITY {
            inner.entries.pop_front();
        }
    }

    pub fn record_script_error(&self, rationale: impl Into<String>, fields: DiagnosticFields) {
        self.record(DiagnosticKind::Script, rationale, fields);
    }

    pub fn record_shader_error(&self, rationale: impl Into<String>, fields: DiagnosticFields) {
        self.record(DiagnosticKind::Shader, rationale, fields);
    }

    pub fn record_message(&self, rationale: impl Into<String>) {
        self.record(DiagnosticKind::Message, rationale, DiagnosticFields::default());
    }

    /// Entries with `index >= since_index`, oldest first, plus the cursor to
    /// resume from on the next poll.
    pub fn since(&self, since_index: u64) -> (Vec<DiagnosticEntry>, u64) {
        let Ok(inner) = self.inner.lock() else { return (Vec::new(), since_index) };
        let entries = inner.entries.iter().filter(|e| e.index >= since_index).cloned().collect();
        (entries, inner.next_index)
    }

    pub fn counts(&self) -> (u64, u64) {
        let Ok(inner) = self.inner.lock() else { return (0, 0) };
        (inner.error_count, inner.warning_count)
    }

    /// Resets the ring and totals. Used by tests, never by clients.
    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.entries.clear();
            inner.error_count = 0;
            inner.warning_count = 0;
        }
    }
}

impl Default for DiagnosticRing {
    fn default() -> Self {
        Self::new()
    }
}

struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            use std::fmt::Write;
            let _ = write!(self.message, "{value:?}");
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        }
    }
}

impl<S> Layer<S> for DiagnosticRing
where
    S: Subscriber,
{
    /// Captures ERROR and WARN events into the ring. None of the lock-held
    /// code in `record` itself logs, so this can't reenter.
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let kind = match *metadata.level() {
            Level::ERROR => DiagnosticKind::Error,
            Level::WARN => DiagnosticKind::Warning,
            _ => return,
        };

        let mut visitor = MessageVisitor { message: String::new() };
        event.record(&mut visitor);

        let fields = DiagnosticFields {
            file: metadata.file().map(str::to_owned),
            line: metadata.line(),
            function: None,
            code: None,
        };
        self.record(kind, visitor.message, fields);
    }
}

#[cfg(test)]
#[path = "diagnostics_tests.rs"]
mod tests;
