use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Mutex;

use grb_bridge::{GameHost, InputEvent, NodeMatch, NodeQuery, NodeRef, RuntimeInfo, SceneNode, Screenshot, Value};

struct Node {
    name: String,
    node_type: String,
    path: String,
    groups: Vec<String>,
    properties: RefCell<BTreeMap<String, Value>>,
    is_button: bool,
}

/// A tiny in-memory scene graph standing in for a real engine, so the
/// bridge can be driven end-to-end over a real socket without one.
pub struct FakeGameHost {
    nodes: Vec<Node>,
    injected: Mutex<Vec<InputEvent>>,
    quit_requested: Mutex<bool>,
    interception_active: Mutex<bool>,
}

impl FakeGameHost {
    pub fn new() -> Self {
        let nodes = vec![
            Node {
                name: "Root".into(),
                node_type: "Node2D".into(),
                path: "/root".into(),
                groups: vec![],
                properties: RefCell::new(BTreeMap::new()),
                is_button: false,
            },
            Node {
                name: "StartButton".into(),
                node_type: "Button".into(),
                path: "/root/Hud/StartButton".into(),
                groups: vec!["ui".into()],
                properties: RefCell::new(BTreeMap::from([(
                    "text".to_owned(),
                    Value::String("Start".to_owned()),
                )])),
                is_button: true,
            },
            Node {
                name: "Player".into(),
                node_type: "CharacterBody2D".into(),
                path: "/root/Player".into(),
                groups: vec!["actors".into()],
                properties: RefCell::new(BTreeMap::from([(
                    "health".to_owned(),
                    Value::Int(100),
                )])),
                is_button: false,
            },
        ];
        Self {
            nodes,
            injected: Mutex::new(Vec::new()),
            quit_requested: Mutex::new(false),
            interception_active: Mutex::new(false),
        }
    }

    fn find_by_ref(&self, node: NodeRef) -> Option<&Node> {
        self.nodes.get(node as usize)
    }

    pub fn quit_was_requested(&self) -> bool {
        *self.quit_requested.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn interception_active(&self) -> bool {
        *self.interception_active.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Walk the path-addressed node list as a nested tree rooted at
    /// `/root`, truncating `children` to empty once `max_depth` is
    /// reached. Mirrors how a real scene tree's depth limit only hides
    /// grandchildren, never the node at the boundary itself.
    fn build_subtree(&self, path: &str, depth: u32, max_depth: u32) -> SceneNode {
        let node = self.nodes.iter().find(|n| n.path == path);
        let (name, node_type) = node
            .map(|n| (n.name.clone(), n.node_type.clone()))
            .unwrap_or_else(|| ("Root".to_owned(), "Node2D".to_owned()));
        let children = if depth >= max_depth {
            Vec::new()
        } else {
            self.nodes
                .iter()
                .filter(|n| is_direct_child(path, &n.path))
                .map(|n| self.build_subtree(&n.path, depth + 1, max_depth))
                .collect()
        };
        SceneNode { name, node_type, children }
    }
}

/// Whether `child` is an immediate descendant of `parent` in the
/// `/`-separated path hierarchy (e.g. `/root/Hud/StartButton` is a
/// grandchild of `/root`, not a direct child).
fn is_direct_child(parent: &str, child: &str) -> bool {
    let Some(rest) = child.strip_prefix(parent) else { return false };
    let Some(rest) = rest.strip_prefix('/') else { return false };
    !rest.is_empty() && !rest.contains('/')
}

impl Default for FakeGameHost {
    fn default() -> Self {
        Self::new()
    }
}

impl GameHost for FakeGameHost {
    fn resolve_node(&self, path: &str) -> Option<NodeRef> {
        self.nodes.iter().position(|n| n.path == path).map(|i| i as NodeRef)
    }

    fn get_property(&self, node: NodeRef, property: &str) -> Option<Value> {
        self.find_by_ref(node)?.properties.borrow().get(property).cloned()
    }

    fn set_property(&self, node: NodeRef, property: &str, value: &Value) -> bool {
        let Some(n) = self.find_by_ref(node) else { return false };
        n.properties.borrow_mut().insert(property.to_owned(), value.clone());
        true
    }

    fn call_method(&self, node: NodeRef, method: &str, args: &[Value]) -> Option<Value> {
        let n = self.find_by_ref(node)?;
        match method {
            "get_name" => Some(Value::String(n.name.clone())),
            "echo" => Some(args.first().cloned().unwrap_or_else(Value::null)),
            _ => None,
        }
    }

    fn scene_tree(&self, max_depth: u32) -> SceneNode {
        self.build_subtree("/root", 0, max_depth)
    }

    fn find_nodes(&self, query: &NodeQuery) -> Vec<NodeMatch> {
        self.nodes
            .iter()
            .filter(|n| {
                let name_ok = query
                    .name
                    .as_deref()
                    .map(|want| want == "*" || n.name.eq_ignore_ascii_case(want))
                    .unwrap_or(true);
                let type_ok = query.node_type.as_deref().map(|t| n.node_type == t).unwrap_or(true);
                let group_ok = query.group.as_deref().map(|g| n.groups.iter().any(|x| x == g)).unwrap_or(true);
                name_ok && type_ok && group_ok
            })
            .take(if query.limit == 0 { usize::MAX } else { query.limit })
            .map(|n| NodeMatch {
                name: n.name.clone(),
                node_type: n.node_type.clone(),
                path: n.path.clone(),
                groups: n.groups.clone(),
            })
            .collect()
    }

    fn capture_screenshot(&self) -> Result<Screenshot, String> {
        // 1x1 transparent PNG, just enough to exercise the base64 path.
        let png_bytes = vec![
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
            0x44, 0x52,
        ];
        Ok(Screenshot { width: 1, height: 1, png_bytes })
    }

    fn runtime_info(&self) -> RuntimeInfo {
        RuntimeInfo {
            engine_version: "grb-harness/0".into(),
            fps: 60.0,
            process_frames: 0,
            time_scale: 1.0,
            current_scene: "res://main.tscn".into(),
            current_scene_name: "Main".into(),
            node_count: self.nodes.len() as u64,
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

    fn press_button(&self, name: &str) -> bool {
        self.nodes.iter().any(|n| n.is_button && n.name == name)
    }

    fn inject_input(&self, event: &InputEvent) {
        self.injected.lock().unwrap_or_else(|e| e.into_inner()).push(event.clone());
    }

    fn set_input_interception(&self, active: bool) {
        *self.interception_active.lock().unwrap_or_else(|e| e.into_inner()) = active;
    }

    fn warp_os_cursor(&self, _x: f64, _y: f64) {}

    fn invoke_vibration(&self, _weak: f64, _strong: f64, _duration_ms: u32) {}

    fn eval(&self, expr: &str) -> Result<String, String> {
        Ok(format!("{expr} => ok"))
    }

    fn run_custom_command(&self, name: &str, _args: &[Value]) -> Option<Value> {
        match name {
            "ping_custom" => Some(Value::String("pong".into())),
            _ => None,
        }
    }

    fn request_quit(&self) {
        *self.quit_requested.lock().unwrap_or_else(|e| e.into_inner()) = true;
    }

    fn disable_low_processor_mode(&self) {}
}
