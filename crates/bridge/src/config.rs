// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Activation-gate configuration.
//!
//! Not a `clap::Parser` — the bridge is started in-process by the host,
//! not from a command line — so values are read straight from the
//! environment the host process was launched with. The lookup is
//! parameterized over a `Fn(&str) -> Option<String>` rather than calling
//! `std::env::var` directly, so tests can exercise every branch without
//! mutating global process state.

use rand::Rng;

use crate::registry::Tier;
use crate::session::InputMode;

/// Alphabet used for auto-generated tokens.
const TOKEN_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Number of characters sampled for a generated token.
const TOKEN_LEN: usize = 24;

fn generate_token() -> String {
    let mut rng = rand::rng();
    (0..TOKEN_LEN).map(|_| TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())] as char).collect()
}

/// Resolved configuration for one bridge activation.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub token: String,
    pub bind_port: u16,
    pub session_tier: Tier,
    pub danger_enabled: bool,
    pub input_mode: InputMode,
    pub force_windowed: bool,
}

impl BridgeConfig {
    /// Read every supported environment variable and apply defaults.
    /// Never fails — absent or malformed values fall back to defaults;
    /// only the activation gate itself can refuse to start.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Core of [`Self::from_env`], parameterized over the variable lookup
    /// so it can be unit tested without touching real process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let token = match lookup("GDRB_TOKEN") {
            Some(t) if !t.is_empty() => t,
            _ => generate_token(),
        };

        let bind_port = lookup("GDRB_PORT").and_then(|s| s.parse::<u16>().ok()).unwrap_or(0);

        let session_tier = lookup("GDRB_TIER")
            .and_then(|s| s.parse::<i64>().ok())
            .map(Tier::clamp)
            .unwrap_or(Tier::Input);

        let danger_enabled = lookup("GDRB_ENABLE_DANGER").map(|v| v == "1").unwrap_or(false);

        let input_mode = lookup("GDRB_INPUT_MODE")
            .map(|v| InputMode::from_env_str(&v))
            .unwrap_or(InputMode::Synthetic);

        let force_windowed = lookup("GDRB_FORCE_WINDOWED").map(|v| v == "1").unwrap_or(false);

        Self { token, bind_port, session_tier, danger_enabled, input_mode, force_windowed }
    }

    /// The environment gate: a non-empty `GDRB_TOKEN`,
    /// or the legacy `GODOT_DEBUG_SERVER=1` flag.
    pub fn environment_gate_passed(lookup: impl Fn(&str) -> Option<String>) -> bool {
        let has_token = lookup("GDRB_TOKEN").map(|t| !t.is_empty()).unwrap_or(false);
        let legacy = lookup("GODOT_DEBUG_SERVER").map(|v| v == "1").unwrap_or(false);
        has_token || legacy
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
