// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tier-2 (Control) handlers: state mutation.

use serde_json::{Map, Value as Json};

use super::{opt_value_array, require_str, single, HandlerError, HandlerResult};
use crate::host::GameHost;
use crate::value::Value;

pub fn set_property(args: &Map<String, Json>, host: &dyn GameHost) -> HandlerResult {
    let node_path = require_str(args, "node")?;
    let property = require_str(args, "property")?;
    let value = args.get("value").ok_or_else(|| HandlerError::bad_args("missing arg `value`"))?;
    let node = host.resolve_node(node_path).ok_or_else(|| HandlerError::not_found("node not found"))?;
    if host.set_property(node, property, &Value::from_json(value)) {
        Ok(Map::new())
    } else {
        Err(HandlerError::not_found("property not found"))
    }
}

pub fn call_method(args: &Map<String, Json>, host: &dyn GameHost) -> HandlerResult {
    let node_path = require_str(args, "node")?;
    let method = require_str(args, "method")?;
    let call_args = opt_value_array(args, "args");
    let node = host.resolve_node(node_path).ok_or_else(|| HandlerError::not_found("node not found"))?;
    let result = host
        .call_method(node, method, &call_args)
        .ok_or_else(|| HandlerError::not_found("method not found"))?;
    Ok(single("result", result.to_json()))
}

/// Requests termination on the next safe tick — deferred so this response
/// itself can still be flushed to the socket first.
pub fn quit(host: &dyn GameHost) -> HandlerResult {
    host.request_quit();
    Ok(Map::new())
}

pub fn run_custom_command(args: &Map<String, Json>, host: &dyn GameHost) -> HandlerResult {
    let name = require_str(args, "name")?;
    let call_args = opt_value_array(args, "args");
    let result = host
        .run_custom_command(name, &call_args)
        .ok_or_else(|| HandlerError::not_found(format!("no custom command registered as `{name}`")))?;
    Ok(single("result", result.to_json()))
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
