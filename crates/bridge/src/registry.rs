// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command registry: a closed, compile-time table of command
//! name → required tier. Modeled as a static slice rather than a runtime
//! map so outside code cannot register or mutate entries — tier and
//! token-exemption are properties of the table, not runtime flags.

use std::fmt;

/// Capability tier required to invoke a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Observe = 0,
    Input = 1,
    Control = 2,
    Danger = 3,
}

impl Tier {
    /// Clamp an arbitrary integer into `[0, 3]`.
    pub fn clamp(raw: i64) -> Self {
        match raw {
            raw if raw <= 0 => Self::Observe,
            1 => Self::Input,
            2 => Self::Control,
            _ => Self::Danger,
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Static record for one command: its name, required tier, and whether it
/// is exempt from token checks.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    pub tier: Tier,
    pub token_exempt: bool,
}

/// The closed command table. Ordering here is cosmetic; lookups
/// are linear (~25 entries — a `match` or `HashMap` would both be
/// overkill for how rarely this runs relative to a frame tick).
pub const COMMANDS: &[CommandSpec] = &[
    // Tier 0 — Observe
    CommandSpec { name: "ping", tier: Tier::Observe, token_exempt: true },
    CommandSpec { name: "auth_info", tier: Tier::Observe, token_exempt: true },
    CommandSpec { name: "capabilities", tier: Tier::Observe, token_exempt: false },
    CommandSpec { name: "screenshot", tier: Tier::Observe, token_exempt: false },
    CommandSpec { name: "scene_tree", tier: Tier::Observe, token_exempt: false },
    CommandSpec { name: "get_property", tier: Tier::Observe, token_exempt: false },
    CommandSpec { name: "runtime_info", tier: Tier::Observe, token_exempt: false },
    CommandSpec { name: "get_errors", tier: Tier::Observe, token_exempt: false },
    CommandSpec { name: "wait_for", tier: Tier::Observe, token_exempt: false },
    CommandSpec { name: "find_nodes", tier: Tier::Observe, token_exempt: false },
    CommandSpec { name: "audio_state", tier: Tier::Observe, token_exempt: false },
    CommandSpec { name: "network_state", tier: Tier::Observe, token_exempt: false },
    CommandSpec { name: "grb_performance", tier: Tier::Observe, token_exempt: false },
    // Tier 1 — Input
    CommandSpec { name: "click", tier: Tier::Input, token_exempt: false },
    CommandSpec { name: "key", tier: Tier::Input, token_exempt: false },
    CommandSpec { name: "press_button", tier: Tier::Input, token_exempt: false },
    CommandSpec { name: "drag", tier: Tier::Input, token_exempt: false },
    CommandSpec { name: "scroll", tier: Tier::Input, token_exempt: false },
    CommandSpec { name: "gesture", tier: Tier::Input, token_exempt: false },
    CommandSpec { name: "gamepad", tier: Tier::Input, token_exempt: false },
    // Tier 2 — Control
    CommandSpec { name: "set_property", tier: Tier::Control, token_exempt: false },
    CommandSpec { name: "call_method", tier: Tier::Control, token_exempt: false },
    CommandSpec { name: "quit", tier: Tier::Control, token_exempt: false },
    CommandSpec { name: "run_custom_command", tier: Tier::Control, token_exempt: false },
    // Tier 3 — Danger
    CommandSpec { name: "eval", tier: Tier::Danger, token_exempt: false },
];

/// Look up a command's required tier, if it is known.
pub fn lookup_tier(name: &str) -> Option<Tier> {
    COMMANDS.iter().find(|c| c.name == name).map(|c| c.tier)
}

/// Whether `name` is a command in the closed table.
pub fn is_known(name: &str) -> bool {
    COMMANDS.iter().any(|c| c.name == name)
}

/// Whether `name` is exempt from the shared-token check.
pub fn is_token_exempt(name: &str) -> bool {
    COMMANDS.iter().any(|c| c.name == name && c.token_exempt)
}

/// All command names with `tier <= max_tier`, sorted lexicographically.
pub fn commands_for_tier(max_tier: Tier) -> Vec<&'static str> {
    let mut names: Vec<&'static str> =
        COMMANDS.iter().filter(|c| c.tier <= max_tier).map(|c| c.name).collect();
    names.sort_unstable();
    names
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
