// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tier-3 (Danger) handlers. Just `eval` — reachable only when the
//! dispatcher has already confirmed `danger_enabled`, so this module
//! carries no gating logic of its own.

use serde_json::Map;

use super::{require_str, single, HandlerError, HandlerResult};
use crate::host::GameHost;

pub fn eval(args: &Map<String, serde_json::Value>, host: &dyn GameHost) -> HandlerResult {
    let expr = require_str(args, "expr")?;
    let result = host.eval(expr).map_err(HandlerError::internal)?;
    Ok(single("result", serde_json::Value::String(result)))
}

#[cfg(test)]
#[path = "danger_tests.rs"]
mod tests;
