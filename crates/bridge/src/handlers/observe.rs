// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tier-0 (Observe) handlers: read-only introspection. None of these ever
//! require a token (the registry marks most of them token-exempt or not —
//! exemption itself is enforced by the dispatcher, not here).

use base64::Engine;
use serde_json::{Map, Value as Json};

use super::{opt_str, opt_u32, opt_usize, single, HandlerError, HandlerResult};
use crate::diagnostics::DiagnosticRing;
use crate::host::{GameHost, NodeMatch, NodeQuery, SceneNode};
use crate::protocol::PROTO;
use crate::registry;
use crate::session::Session;
use crate::value::Value;

pub fn ping() -> HandlerResult {
    Ok(single("pong", Json::Bool(true)))
}

pub fn auth_info(session: &Session) -> HandlerResult {
    let mut map = Map::new();
    map.insert("proto".to_owned(), Json::String(PROTO.to_owned()));
    map.insert("tier".to_owned(), Json::from(session.session_tier.as_u8()));
    map.insert("danger_enabled".to_owned(), Json::Bool(session.danger_enabled));
    Ok(map)
}

pub fn capabilities(session: &Session) -> HandlerResult {
    let commands = registry::commands_for_tier(session.session_tier);
    let mut map = Map::new();
    map.insert("tier".to_owned(), Json::from(session.session_tier.as_u8()));
    map.insert("commands".to_owned(), Json::Array(commands.into_iter().map(|c| Json::String(c.to_owned())).collect()));
    Ok(map)
}

pub fn screenshot(host: &dyn GameHost) -> HandlerResult {
    let shot = host.capture_screenshot().map_err(HandlerError::internal)?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(&shot.png_bytes);
    let mut map = Map::new();
    map.insert("width".to_owned(), Json::from(shot.width));
    map.insert("height".to_owned(), Json::from(shot.height));
    map.insert("png_base64".to_owned(), Json::String(encoded));
    Ok(map)
}

fn scene_node_to_json(node: &SceneNode) -> Json {
    let mut map = Map::new();
    map.insert("name".to_owned(), Json::String(node.name.clone()));
    map.insert("type".to_owned(), Json::String(node.node_type.clone()));
    map.insert("children".to_owned(), Json::Array(node.children.iter().map(scene_node_to_json).collect()));
    Json::Object(map)
}

pub fn scene_tree(args: &Map<String, Json>, host: &dyn GameHost) -> HandlerResult {
    let max_depth = opt_u32(args, "max_depth", 10);
    let tree = host.scene_tree(max_depth);
    match scene_node_to_json(&tree) {
        Json::Object(map) => Ok(map),
        other => Ok(single("tree", other)),
    }
}

pub fn get_property(args: &Map<String, Json>, host: &dyn GameHost) -> HandlerResult {
    let node_path = super::require_str(args, "node")?;
    let property = super::require_str(args, "property")?;
    let node = host.resolve_node(node_path).ok_or_else(|| HandlerError::not_found("node not found"))?;
    let value = host.get_property(node, property).ok_or_else(|| HandlerError::not_found("property not found"))?;
    Ok(single("value", value.to_json()))
}

pub fn runtime_info(host: &dyn GameHost, session: &Session, ring: &DiagnosticRing) -> HandlerResult {
    let info = host.runtime_info();
    let (error_count, warning_count) = ring.counts();
    let mut map = Map::new();
    map.insert("engine_version".to_owned(), Json::String(info.engine_version));
    map.insert("fps".to_owned(), Json::from(info.fps));
    map.insert("process_frames".to_owned(), Json::from(info.process_frames));
    map.insert("time_scale".to_owned(), Json::from(info.time_scale));
    map.insert("current_scene".to_owned(), Json::String(info.current_scene));
    map.insert("current_scene_name".to_owned(), Json::String(info.current_scene_name));
    map.insert("node_count".to_owned(), Json::from(info.node_count));
    map.insert("input_mode".to_owned(), Json::String(session.input_mode.to_string()));
    map.insert("error_count".to_owned(), Json::from(error_count));
    map.insert("warning_count".to_owned(), Json::from(warning_count));
    Ok(map)
}

pub fn get_errors(args: &Map<String, Json>, ring: &DiagnosticRing) -> HandlerResult {
    let since_index = args.get("since_index").and_then(Json::as_u64).unwrap_or(0);
    let (entries, next_index) = ring.since(since_index);
    let (error_count, warning_count) = ring.counts();
    let mut map = Map::new();
    map.insert(
        "errors".to_owned(),
        Json::Array(entries.iter().map(|e| serde_json::to_value(e).unwrap_or(Json::Null)).collect()),
    );
    map.insert("next_index".to_owned(), Json::from(next_index));
    map.insert("error_count".to_owned(), Json::from(error_count));
    map.insert("warning_count".to_owned(), Json::from(warning_count));
    Ok(map)
}

fn node_match_to_json(m: &NodeMatch) -> Json {
    let mut map = Map::new();
    map.insert("name".to_owned(), Json::String(m.name.clone()));
    map.insert("type".to_owned(), Json::String(m.node_type.clone()));
    map.insert("path".to_owned(), Json::String(m.path.clone()));
    map.insert("groups".to_owned(), Json::Array(m.groups.iter().map(|g| Json::String(g.clone())).collect()));
    Json::Object(map)
}

pub fn find_nodes(args: &Map<String, Json>, host: &dyn GameHost) -> HandlerResult {
    let name = opt_str(args, "name").map(str::to_owned);
    let node_type = opt_str(args, "type").map(str::to_owned);
    let group = opt_str(args, "group").map(str::to_owned);
    if name.is_none() && node_type.is_none() && group.is_none() {
        return Err(HandlerError::bad_args("find_nodes requires at least one of name/type/group"));
    }
    let limit = opt_usize(args, "limit", 50);
    let query = NodeQuery { name, node_type, group, limit };
    let matches = host.find_nodes(&query);
    let mut map = Map::new();
    map.insert("count".to_owned(), Json::from(matches.len()));
    map.insert("matches".to_owned(), Json::Array(matches.iter().map(node_match_to_json).collect()));
    Ok(map)
}

/// Flattens host telemetry (`audio_state`, `network_state`,
/// `grb_performance`) into the response envelope. A non-map `Value` (the
/// host's telemetry surface is expected to be a mapping, but nothing
/// enforces that at the trait boundary) is wrapped under `value` instead of
/// silently dropped.
fn flatten_telemetry(value: Value) -> Map<String, Json> {
    match value {
        Value::Map(map) => map.into_iter().map(|(k, v)| (k, v.to_json())).collect(),
        other => single("value", other.to_json()),
    }
}

pub fn audio_state(host: &dyn GameHost) -> HandlerResult {
    Ok(flatten_telemetry(host.audio_state()))
}

pub fn network_state(host: &dyn GameHost) -> HandlerResult {
    Ok(flatten_telemetry(host.network_state()))
}

pub fn grb_performance(host: &dyn GameHost) -> HandlerResult {
    Ok(flatten_telemetry(host.performance_info()))
}

#[cfg(test)]
#[path = "observe_tests.rs"]
mod tests;
