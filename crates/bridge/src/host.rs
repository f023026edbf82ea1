// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The capability seam between the bridge and the engine it's embedded in.
//! [`GameHost`] is everything a handler needs from the
//! live scene graph; the bridge itself never touches engine internals
//! directly, so it can be driven from [`crate`]'s own tests against a fake
//! implementation instead of a real engine.

use crate::value::Value;

/// Opaque handle to a resolved scene node. The bridge never interprets this
/// beyond equality/validity checks; only the host knows what it refers to.
pub type NodeRef = u64;

/// A single input event synthesized by an input handler, passed to the host
/// for injection.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    MouseMotion { x: f64, y: f64, relative: Option<(f64, f64)> },
    MousePress { x: f64, y: f64, button: MouseButton },
    MouseRelease { x: f64, y: f64, button: MouseButton },
    Wheel { x: f64, y: f64, button: MouseButton, magnitude: u32 },
    KeyPress { keycode: i64 },
    KeyRelease { keycode: i64 },
    ActionPress { action: String },
    ActionRelease { action: String },
    GesturePinch { center_x: f64, center_y: f64, scale: f64 },
    GestureSwipe { center_x: f64, center_y: f64, delta_x: f64, delta_y: f64 },
    GamepadButtonPress { button: i64 },
    GamepadButtonRelease { button: i64 },
    GamepadAxis { axis: i64, value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    WheelUp,
    WheelDown,
}

/// One node in a `scene_tree` walk.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub node_type: String,
    pub children: Vec<SceneNode>,
}

/// One match in a `find_nodes` scan.
#[derive(Debug, Clone)]
pub struct NodeMatch {
    pub name: String,
    pub node_type: String,
    pub path: String,
    pub groups: Vec<String>,
}

/// Search predicates accepted by `find_nodes`. At least one must be set
/// (enforced by the caller, not this type).
#[derive(Debug, Clone, Default)]
pub struct NodeQuery {
    pub name: Option<String>,
    pub node_type: Option<String>,
    pub group: Option<String>,
    pub limit: usize,
}

/// A captured frame, ready for base64 encoding by the handler.
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub png_bytes: Vec<u8>,
}

/// Snapshot of engine runtime telemetry. Error
/// and warning counts are filled in by the dispatcher from the diagnostic
/// ring, not by the host.
#[derive(Debug, Clone)]
pub struct RuntimeInfo {
    pub engine_version: String,
    pub fps: f64,
    pub process_frames: u64,
    pub time_scale: f64,
    pub current_scene: String,
    pub current_scene_name: String,
    pub node_count: u64,
}

/// The capability interface a concrete engine integration implements.
/// Object-safe for use as `Box<dyn GameHost>` so the bridge's core stays
/// decoupled from any specific engine binding.
pub trait GameHost: Send {
    /// Resolve a hierarchical path string to a live node, or `None` if no
    /// such node exists (→ `not_found` at the handler boundary).
    fn resolve_node(&self, path: &str) -> Option<NodeRef>;

    fn get_property(&self, node: NodeRef, property: &str) -> Option<Value>;

    fn set_property(&self, node: NodeRef, property: &str, value: &Value) -> bool;

    /// Invoke a method by name; `None` means the method does not exist on
    /// this node (→ `not_found`).
    fn call_method(&self, node: NodeRef, method: &str, args: &[Value]) -> Option<Value>;

    fn scene_tree(&self, max_depth: u32) -> SceneNode;

    fn find_nodes(&self, query: &NodeQuery) -> Vec<NodeMatch>;

    fn capture_screenshot(&self) -> Result<Screenshot, String>;

    fn runtime_info(&self) -> RuntimeInfo;

    fn audio_state(&self) -> Value;

    fn network_state(&self) -> Value;

    fn performance_info(&self) -> Value;

    /// Locate a button-typed node by name and trigger its activation signal.
    /// `false` means no such button was found (→ `not_found`).
    fn press_button(&self, name: &str) -> bool;

    /// Inject one bridge-synthesized event. Every event that reaches the
    /// host through this method is, by construction, the tagged event a
    /// synthetic-mode viewport is expected to let through; nothing the
    /// bridge itself generates is ever untagged.
    fn inject_input(&self, event: &InputEvent);

    /// Toggle viewport interception of untagged real-device input.
    /// `true` while a synthetic-mode session is active: only events
    /// arriving through [`Self::inject_input`] should reach game-facing
    /// handlers. `false` once the bridge deactivates, or for the whole
    /// session lifetime in OS input mode, which injects alongside real
    /// input rather than isolating from it.
    fn set_input_interception(&self, active: bool);

    fn warp_os_cursor(&self, x: f64, y: f64);

    fn invoke_vibration(&self, weak: f64, strong: f64, duration_ms: u32);

    /// Evaluate an expression against the scene root. `Err` carries a
    /// human-readable failure message (→ `internal_error`).
    fn eval(&self, expr: &str) -> Result<String, String>;

    /// Look up a game-registered custom command by name and invoke it.
    /// `None` means no such command is registered (→ `not_found`).
    fn run_custom_command(&self, name: &str, args: &[Value]) -> Option<Value>;

    /// Request termination on the next safe tick; must not block.
    fn request_quit(&self);

    /// Disable the engine's low-processor/idle-throttling mode so
    /// automation runs at full frame rate.
    fn disable_low_processor_mode(&self);
}
