// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tier-1 (Input) handlers: simulated mouse, keyboard, gesture, and
//! gamepad events.
//!
//! Mouse presses (and gamepad button presses) require a release on the
//! *next* frame tick. Rather than a separate timer per event kind, a
//! single [`DeferredReleaseSlot`] holds one pending release event,
//! generalized to any [`InputEvent`] rather than just mouse releases,
//! since only one can ever be outstanding at a time regardless of source.

use serde_json::{Map, Value as Json};

use super::{opt_i64, opt_str, require_f64, require_point, HandlerError, HandlerResult};
use crate::host::{GameHost, InputEvent, MouseButton};
use crate::session::InputMode;

/// Holds at most one pending release event, consumed at the top of the next
/// frame tick.
#[derive(Default)]
pub struct DeferredReleaseSlot {
    pending: Option<InputEvent>,
}

impl DeferredReleaseSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, event: InputEvent) {
        self.pending = Some(event);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Inject the pending release, if any, and clear the slot. Called once
    /// at the top of every frame tick, before draining the inbound queue.
    pub fn apply(&mut self, host: &dyn GameHost) {
        if let Some(event) = self.pending.take() {
            host.inject_input(&event);
        }
    }
}

fn inject(host: &dyn GameHost, input_mode: InputMode, event: InputEvent) {
    if let InputEvent::MouseMotion { x, y, .. } = &event {
        if input_mode == InputMode::Os {
            host.warp_os_cursor(*x, *y);
        }
    }
    host.inject_input(&event);
}

pub fn click(
    args: &Map<String, Json>,
    host: &dyn GameHost,
    input_mode: InputMode,
    deferred: &mut DeferredReleaseSlot,
) -> HandlerResult {
    let x = require_f64(args, "x")?;
    let y = require_f64(args, "y")?;
    inject(host, input_mode, InputEvent::MouseMotion { x, y, relative: None });
    inject(host, input_mode, InputEvent::MousePress { x, y, button: MouseButton::Left });
    deferred.set(InputEvent::MouseRelease { x, y, button: MouseButton::Left });
    Ok(Map::new())
}

pub fn drag(
    args: &Map<String, Json>,
    host: &dyn GameHost,
    input_mode: InputMode,
    deferred: &mut DeferredReleaseSlot,
) -> HandlerResult {
    let (from_x, from_y) = require_point(args, "from")?;
    let (to_x, to_y) = require_point(args, "to")?;
    inject(host, input_mode, InputEvent::MouseMotion { x: from_x, y: from_y, relative: None });
    inject(host, input_mode, InputEvent::MousePress { x: from_x, y: from_y, button: MouseButton::Left });
    inject(
        host,
        input_mode,
        InputEvent::MouseMotion { x: to_x, y: to_y, relative: Some((to_x - from_x, to_y - from_y)) },
    );
    deferred.set(InputEvent::MouseRelease { x: to_x, y: to_y, button: MouseButton::Left });
    Ok(Map::new())
}

pub fn scroll(args: &Map<String, Json>, host: &dyn GameHost, input_mode: InputMode) -> HandlerResult {
    let x = require_f64(args, "x")?;
    let y = require_f64(args, "y")?;
    let delta = args.get("delta").and_then(Json::as_f64).unwrap_or(-3.0);
    let button = if delta >= 0.0 { MouseButton::WheelUp } else { MouseButton::WheelDown };
    let magnitude = delta.abs().round() as u32;
    inject(host, input_mode, InputEvent::Wheel { x, y, button, magnitude });
    Ok(Map::new())
}

pub fn key(args: &Map<String, Json>, host: &dyn GameHost, input_mode: InputMode) -> HandlerResult {
    if let Some(action) = opt_str(args, "action") {
        let action = action.to_owned();
        inject(host, input_mode, InputEvent::ActionPress { action: action.clone() });
        inject(host, input_mode, InputEvent::ActionRelease { action });
        return Ok(Map::new());
    }
    if let Some(keycode) = opt_i64(args, "keycode") {
        if keycode >= 0 {
            inject(host, input_mode, InputEvent::KeyPress { keycode });
            inject(host, input_mode, InputEvent::KeyRelease { keycode });
            return Ok(Map::new());
        }
    }
    Err(HandlerError::bad_args("key requires a non-empty `action` or a non-negative `keycode`"))
}

pub fn press_button(args: &Map<String, Json>, host: &dyn GameHost) -> HandlerResult {
    let name = super::require_str(args, "name")?;
    if host.press_button(name) {
        Ok(Map::new())
    } else {
        Err(HandlerError::not_found(format!("no button node named `{name}`")))
    }
}

/// `gesture(type, params)` — `center`/`scale`/`delta` live under `params`,
/// not at the top level of `args`, so `pinch`/`swipe` read from that
/// sub-map rather than from `args` directly.
pub fn gesture(args: &Map<String, Json>, host: &dyn GameHost, input_mode: InputMode) -> HandlerResult {
    let kind = super::require_str(args, "type")?;
    let params = args
        .get("params")
        .and_then(Json::as_object)
        .ok_or_else(|| HandlerError::bad_args("gesture requires a `params` object"))?;
    match kind {
        "pinch" => {
            let (cx, cy) = require_point(params, "center")?;
            let scale = params
                .get("scale")
                .and_then(Json::as_f64)
                .ok_or_else(|| HandlerError::bad_args("pinch gesture requires `scale`"))?;
            inject(host, input_mode, InputEvent::GesturePinch { center_x: cx, center_y: cy, scale });
            Ok(Map::new())
        }
        "swipe" => {
            let (cx, cy) = require_point(params, "center")?;
            let (dx, dy) = require_point(params, "delta")?;
            inject(
                host,
                input_mode,
                InputEvent::GestureSwipe { center_x: cx, center_y: cy, delta_x: dx, delta_y: dy },
            );
            Ok(Map::new())
        }
        other => Err(HandlerError::bad_args(format!("unknown gesture type `{other}`"))),
    }
}

pub fn gamepad(
    args: &Map<String, Json>,
    host: &dyn GameHost,
    deferred: &mut DeferredReleaseSlot,
) -> HandlerResult {
    let action = super::require_str(args, "action")?;
    match action {
        "button" => {
            let button = opt_i64(args, "button")
                .ok_or_else(|| HandlerError::bad_args("gamepad button action requires `button`"))?;
            host.inject_input(&InputEvent::GamepadButtonPress { button });
            deferred.set(InputEvent::GamepadButtonRelease { button });
            Ok(Map::new())
        }
        "axis" => {
            let axis = opt_i64(args, "axis")
                .ok_or_else(|| HandlerError::bad_args("gamepad axis action requires `axis`"))?;
            let value = args
                .get("value")
                .and_then(Json::as_f64)
                .ok_or_else(|| HandlerError::bad_args("gamepad axis action requires `value`"))?;
            host.inject_input(&InputEvent::GamepadAxis { axis, value });
            Ok(Map::new())
        }
        "vibrate" => {
            let weak = args.get("weak").and_then(Json::as_f64).unwrap_or(1.0);
            let strong = args.get("strong").and_then(Json::as_f64).unwrap_or(1.0);
            let duration_ms = args.get("duration_ms").and_then(Json::as_u64).unwrap_or(200) as u32;
            host.invoke_vibration(weak, strong, duration_ms);
            Ok(Map::new())
        }
        other => Err(HandlerError::bad_args(format!("unknown gamepad action `{other}`"))),
    }
}

#[cfg(test)]
#[path = "input_tests.rs"]
mod tests;
