// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Black-box test harness: activates a real [`grb_bridge::Bridge`] against
//! an in-memory fake scene graph and drives it over a real loopback
//! `TcpStream`, the way an external debugging client would.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use grb_bridge::{
    Bridge, BridgeConfig, GameHost, InputEvent, InputMode, NodeMatch, NodeQuery, NodeRef,
    RuntimeInfo, SceneNode, Screenshot, Tier, Value,
};

/// A tiny scene graph: one root, one button, one property-bearing node.
/// Deliberately minimal — these tests exercise the bridge's protocol and
/// gating behavior, not scene-graph fidelity (that's `grb-harness`'s job).
pub struct TestHost {
    properties: Mutex<std::collections::BTreeMap<&'static str, Value>>,
    injected: Mutex<Vec<InputEvent>>,
    quit_requested: AtomicBool,
    interception_active: AtomicBool,
    real_input_reached: Mutex<Vec<InputEvent>>,
}

const PLAYER: NodeRef = 1;

impl TestHost {
    pub fn new() -> Self {
        let mut properties = std::collections::BTreeMap::new();
        properties.insert("health", Value::Int(100));
        Self {
            properties: Mutex::new(properties),
            injected: Mutex::new(Vec::new()),
            quit_requested: AtomicBool::new(false),
            interception_active: AtomicBool::new(false),
            real_input_reached: Mutex::new(Vec::new()),
        }
    }

    pub fn injected_events(&self) -> Vec<InputEvent> {
        self.injected.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn quit_was_requested(&self) -> bool {
        self.quit_requested.load(Ordering::Relaxed)
    }

    pub fn interception_is_active(&self) -> bool {
        self.interception_active.load(Ordering::Relaxed)
    }

    /// Stand in for an untagged real-device event arriving at the
    /// viewport. Returns whether it reached game-facing handlers — `false`
    /// means it was filtered by interception, the way a synthetic-mode
    /// session is expected to filter everything but its own injected
    /// events.
    pub fn simulate_real_input(&self, event: InputEvent) -> bool {
        if self.interception_active.load(Ordering::Relaxed) {
            return false;
        }
        self.real_input_reached.lock().unwrap_or_else(|e| e.into_inner()).push(event);
        true
    }

    pub fn real_input_reached(&self) -> Vec<InputEvent> {
        self.real_input_reached.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for TestHost {
    fn default() -> Self {
        Self::new()
    }
}

impl GameHost for TestHost {
    fn resolve_node(&self, path: &str) -> Option<NodeRef> {
        (path == "/root/Player").then_some(PLAYER)
    }

    fn get_property(&self, node: NodeRef, property: &str) -> Option<Value> {
        if node != PLAYER {
            return None;
        }
        self.properties.lock().unwrap_or_else(|e| e.into_inner()).get(property).cloned()
    }

    fn set_property(&self, node: NodeRef, property: &str, value: &Value) -> bool {
        if node != PLAYER {
            return false;
        }
        let key = match property {
            "health" => "health",
            _ => return false,
        };
        self.properties.lock().unwrap_or_else(|e| e.into_inner()).insert(key, value.clone());
        true
    }

    fn call_method(&self, node: NodeRef, method: &str, args: &[Value]) -> Option<Value> {
        if node != PLAYER || method != "echo" {
            return None;
        }
        Some(args.first().cloned().unwrap_or_else(Value::null))
    }

    /// A fixed Root/Hud/StartButton + Root/Player hierarchy, nominal and
    /// independent of `resolve_node`'s single-path scope, used purely to
    /// exercise depth truncation: `children` is emptied once `depth`
    /// reaches `max_depth`, but the node at the boundary still appears.
    fn scene_tree(&self, max_depth: u32) -> SceneNode {
        let start_button = SceneNode { name: "StartButton".into(), node_type: "Button".into(), children: Vec::new() };
        let hud_children = if max_depth > 1 { vec![start_button] } else { Vec::new() };
        let hud = SceneNode { name: "Hud".into(), node_type: "Control".into(), children: hud_children };
        let player = SceneNode { name: "Player".into(), node_type: "CharacterBody2D".into(), children: Vec::new() };
        let root_children = if max_depth > 0 { vec![hud, player] } else { Vec::new() };
        SceneNode { name: "Root".into(), node_type: "Node2D".into(), children: root_children }
    }

    fn find_nodes(&self, query: &NodeQuery) -> Vec<NodeMatch> {
        let matches_player = query
            .name
            .as_deref()
            .map(|n| n.eq_ignore_ascii_case("player") || n == "*")
            .unwrap_or(true);
        if matches_player {
            vec![NodeMatch {
                name: "Player".into(),
                node_type: "CharacterBody2D".into(),
                path: "/root/Player".into(),
                groups: vec!["actors".into()],
            }]
        } else {
            Vec::new()
        }
    }

    fn capture_screenshot(&self) -> Result<Screenshot, String> {
        Ok(Screenshot { width: 1, height: 1, png_bytes: vec![0u8; 8] })
    }

    fn runtime_info(&self) -> RuntimeInfo {
        RuntimeInfo {
            engine_version: "test-host/0".into(),
            fps: 60.0,
            process_frames: 0,
            time_scale: 1.0,
            current_scene: "res://main.tscn".into(),
            current_scene_name: "Main".into(),
            node_count: 1,
        }
    }

    fn audio_state(&self) -> Value {
        Value::null()
    }

    fn network_state(&self) -> Value {
        Value::null()
    }

    fn performance_info(&self) -> Value {
        Value::null()
    }

    fn press_button(&self, _name: &str) -> bool {
        false
    }

    fn inject_input(&self, event: &InputEvent) {
        self.injected.lock().unwrap_or_else(|e| e.into_inner()).push(event.clone());
    }

    fn set_input_interception(&self, active: bool) {
        self.interception_active.store(active, Ordering::Relaxed);
    }

    fn warp_os_cursor(&self, _x: f64, _y: f64) {}

    fn invoke_vibration(&self, _weak: f64, _strong: f64, _duration_ms: u32) {}

    fn eval(&self, expr: &str) -> Result<String, String> {
        if expr.is_empty() {
            Err("empty expression".into())
        } else {
            Ok(format!("{expr}=ok"))
        }
    }

    fn run_custom_command(&self, _name: &str, _args: &[Value]) -> Option<Value> {
        None
    }

    fn request_quit(&self) {
        self.quit_requested.store(true, Ordering::Relaxed);
    }

    fn disable_low_processor_mode(&self) {}
}

/// A running bridge under test: the token/port needed to connect, plus a
/// background tick thread that keeps it alive until dropped.
pub struct RunningBridge {
    pub token: String,
    pub port: u16,
    pub host: Arc<TestHost>,
    stop: Arc<AtomicBool>,
    ticker: Option<std::thread::JoinHandle<()>>,
}

impl RunningBridge {
    /// Activate a bridge at the given tier (and danger flag), bound to an
    /// OS-assigned loopback port, ticking in the background roughly every
    /// 5ms — fast enough that tests don't need generous sleeps.
    pub fn start(tier: Tier, danger_enabled: bool) -> Self {
        // The environment gate reads the real process environment; these
        // integration tests run with the `grb-bridge/grb` build feature
        // enabled (see this crate's Cargo.toml), so only the env var needs
        // setting here. Tests never unset it — safe to leave set for the
        // process lifetime of the test binary.
        std::env::set_var("GDRB_TOKEN", "integration-test-token");
        let test_host = Arc::new(TestHost::new());
        let host: Arc<dyn GameHost> = test_host.clone();
        let config = BridgeConfig {
            token: "integration-test-token".into(),
            bind_port: 0,
            session_tier: tier,
            danger_enabled,
            input_mode: InputMode::Synthetic,
            force_windowed: false,
        };
        // OK to panic in test-only code — a bridge that fails to activate
        // here means the harness itself is misconfigured, not the test.
        #[allow(clippy::panic)]
        let Some(mut bridge) = Bridge::activate_with(host, config) else {
            panic!(
                "bridge failed to activate — ensure grb-specs depends on grb-bridge \
                 with the `grb` feature enabled and GDRB_TOKEN is set"
            );
        };
        let port = bridge.session().bound_port;
        let token = bridge.session().token.clone();

        let stop = Arc::new(AtomicBool::new(false));
        let stop_for_thread = stop.clone();
        let ticker = std::thread::spawn(move || {
            while !stop_for_thread.load(Ordering::Relaxed) {
                bridge.tick();
                std::thread::sleep(Duration::from_millis(5));
            }
        });

        Self { token, port, host: test_host, stop, ticker: Some(ticker) }
    }

    pub fn connect(&self) -> anyhow::Result<TcpStream> {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            match TcpStream::connect(("127.0.0.1", self.port)) {
                Ok(s) => return Ok(s),
                Err(_) if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(e) => anyhow::bail!("could not connect to bridge: {e}"),
            }
        }
    }
}

impl Drop for RunningBridge {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.ticker.take() {
            let _ = handle.join();
        }
    }
}

/// Send one request line and read one response line, with a deadline.
pub fn roundtrip(stream: &mut TcpStream, request: &serde_json::Value) -> anyhow::Result<serde_json::Value> {
    let mut line = serde_json::to_string(request)?;
    line.push('\n');
    stream.write_all(line.as_bytes())?;

    stream.set_read_timeout(Some(Duration::from_secs(5)))?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut response_line = String::new();
    reader.read_line(&mut response_line)?;
    Ok(serde_json::from_str(response_line.trim())?)
}
