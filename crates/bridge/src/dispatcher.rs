// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-frame dispatcher: auth and tier checks, routing to
//! handlers, and response ordering. Runs once per frame tick on the
//! engine's main thread — the only place outside [`crate::waits`] that
//! ever touches [`crate::host::GameHost`].

use std::time::Instant;

use serde_json::Map;

use crate::diagnostics::DiagnosticRing;
use crate::handlers::input::DeferredReleaseSlot;
use crate::handlers::{control, danger, input, observe, HandlerError};
use crate::host::GameHost;
use crate::protocol::{ErrorCode, ParsedLine, Request, Response};
use crate::queues::{InboundQueue, OutboundQueue};
use crate::registry::{self, Tier};
use crate::session::Session;
use crate::value::Value;
use crate::waits::{PendingWait, WaitScheduler, DEFAULT_TIMEOUT_MS};

/// Drain the inbound queue and dispatch every parsed line, pushing
/// serialized responses onto the outbound queue.
///
/// Ordering: responses are pushed in the order requests were dequeued.
/// `wait_for` is the sole exception — it's handed to `waits` instead of
/// producing an immediate response, and resolves (in request order or not)
/// whenever [`crate::waits::WaitScheduler::tick`] next runs.
#[allow(clippy::too_many_arguments)]
pub fn dispatch_frame(
    inbound: &InboundQueue,
    outbound: &OutboundQueue,
    host: &dyn GameHost,
    session: &Session,
    ring: &DiagnosticRing,
    waits: &mut WaitScheduler,
    deferred: &mut DeferredReleaseSlot,
) {
    for line in inbound.drain() {
        let response = match line {
            ParsedLine::Err { id, code } => Response::error(id, code, code.to_string(), Map::new()),
            ParsedLine::Ok(request) => match dispatch_one(&request, host, session, ring, waits, deferred) {
                Some(response) => response,
                None => continue, // wait_for: handed off to the scheduler, no immediate response
            },
        };
        outbound.push(response.to_line());
    }
}

fn dispatch_one(
    request: &Request,
    host: &dyn GameHost,
    session: &Session,
    ring: &DiagnosticRing,
    waits: &mut WaitScheduler,
    deferred: &mut DeferredReleaseSlot,
) -> Option<Response> {
    let Some(tier) = registry::lookup_tier(&request.cmd) else {
        return Some(Response::error(&request.id, ErrorCode::UnknownCmd, "unknown command", Map::new()));
    };

    if !registry::is_token_exempt(&request.cmd) && !session.token_matches(&request.token) {
        return Some(Response::error(&request.id, ErrorCode::BadToken, "token mismatch", Map::new()));
    }

    if tier > session.session_tier {
        let mut extra = Map::new();
        extra.insert("tier_required".to_owned(), serde_json::Value::from(tier.as_u8()));
        return Some(Response::error(&request.id, ErrorCode::TierDenied, "tier exceeds session tier", extra));
    }

    if request.cmd == "eval" && !session.danger_enabled {
        return Some(Response::error(&request.id, ErrorCode::DangerDisabled, "eval is disabled for this session", Map::new()));
    }

    if request.cmd == "wait_for" {
        return dispatch_wait_for(request, host, waits);
    }

    let outcome = invoke_handler(request, host, session, ring, deferred);
    Some(match outcome {
        Ok(data) => Response::ok(&request.id, data),
        Err(HandlerError { code, message, extra }) => Response::error(&request.id, code, message, extra),
    })
}

fn dispatch_wait_for(request: &Request, host: &dyn GameHost, waits: &mut WaitScheduler) -> Option<Response> {
    let node_path = match request.args.get("node").and_then(|v| v.as_str()) {
        Some(n) => n,
        None => return Some(Response::error(&request.id, ErrorCode::BadArgs, "missing arg `node`", Map::new())),
    };
    let property = match request.args.get("property").and_then(|v| v.as_str()) {
        Some(p) => p.to_owned(),
        None => return Some(Response::error(&request.id, ErrorCode::BadArgs, "missing arg `property`", Map::new())),
    };
    let Some(expected_json) = request.args.get("value") else {
        return Some(Response::error(&request.id, ErrorCode::BadArgs, "missing arg `value`", Map::new()));
    };
    let expected = Value::from_json(expected_json);
    let timeout_ms = request.args.get("timeout_ms").and_then(|v| v.as_u64()).unwrap_or(DEFAULT_TIMEOUT_MS);

    let Some(node) = host.resolve_node(node_path) else {
        return Some(Response::error(&request.id, ErrorCode::NotFound, "node not found", Map::new()));
    };

    waits.push(PendingWait { id: request.id.clone(), node, property, expected, timeout_ms, started: Instant::now() });
    None
}

fn invoke_handler(
    request: &Request,
    host: &dyn GameHost,
    session: &Session,
    ring: &DiagnosticRing,
    deferred: &mut DeferredReleaseSlot,
) -> Result<Map<String, serde_json::Value>, HandlerError> {
    let args = &request.args;
    match request.cmd.as_str() {
        "ping" => observe::ping(),
        "auth_info" => observe::auth_info(session),
        "capabilities" => observe::capabilities(session),
        "screenshot" => observe::screenshot(host),
        "scene_tree" => observe::scene_tree(args, host),
        "get_property" => observe::get_property(args, host),
        "runtime_info" => observe::runtime_info(host, session, ring),
        "get_errors" => observe::get_errors(args, ring),
        "find_nodes" => observe::find_nodes(args, host),
        "audio_state" => observe::audio_state(host),
        "network_state" => observe::network_state(host),
        "grb_performance" => observe::grb_performance(host),

        "click" => input::click(args, host, session.input_mode, deferred),
        "drag" => input::drag(args, host, session.input_mode, deferred),
        "scroll" => input::scroll(args, host, session.input_mode),
        "key" => input::key(args, host, session.input_mode),
        "press_button" => input::press_button(args, host),
        "gesture" => input::gesture(args, host, session.input_mode),
        "gamepad" => input::gamepad(args, host, deferred),

        "set_property" => control::set_property(args, host),
        "call_method" => control::call_method(args, host),
        "quit" => control::quit(host),
        "run_custom_command" => control::run_custom_command(args, host),

        "eval" => danger::eval(args, host),

        // Every name the registry knows about is handled above; reaching
        // this arm means the registry and dispatcher tables drifted apart.
        other => {
            Err(HandlerError::internal(format!("command `{other}` is registered but has no handler wired")))
        }
    }
}

/// Tick every outstanding `wait_for` against the live host and push any
/// responses it resolved this frame onto the outbound queue. Called once
/// per frame, after [`dispatch_frame`].
pub fn tick_waits(waits: &mut WaitScheduler, host: &dyn GameHost, outbound: &OutboundQueue) {
    for response in waits.tick(host) {
        outbound.push(response.to_line());
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
