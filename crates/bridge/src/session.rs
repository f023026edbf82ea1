// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session identity: created once at activation, immutable
//! thereafter. No lock needed — every field is fixed for the process
//! lifetime, so readers on either thread see it without synchronization.

use std::fmt;

use crate::registry::Tier;

/// How injected input is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Injected directly into the engine's input queue; never touches the
    /// OS cursor.
    Synthetic,
    /// Synthetic injection plus an OS cursor warp, for parity with real
    /// user input.
    Os,
}

impl InputMode {
    pub fn from_env_str(s: &str) -> Self {
        if s.eq_ignore_ascii_case("os") {
            InputMode::Os
        } else {
            InputMode::Synthetic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputMode::Synthetic => "synthetic",
            InputMode::Os => "os",
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable identity for the lifetime of one activated bridge instance.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub session_tier: Tier,
    pub danger_enabled: bool,
    pub input_mode: InputMode,
    pub bound_port: u16,
}

impl Session {
    /// Constant-time string comparison, to avoid a timing side-channel on
    /// the shared-secret check (ported from the bearer-token comparator
    /// used for the mux proxy's HTTP auth layer).
    pub fn token_matches(&self, candidate: &str) -> bool {
        let expected = self.token.as_bytes();
        let given = candidate.as_bytes();
        if expected.len() != given.len() {
            return false;
        }
        let mut acc = 0u8;
        for (a, b) in expected.iter().zip(given.iter()) {
            acc |= a ^ b;
        }
        acc == 0
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
