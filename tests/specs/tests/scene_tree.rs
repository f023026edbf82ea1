// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use grb_bridge::Tier;
use grb_specs::{roundtrip, RunningBridge};
use serde_json::json;

#[test]
fn max_depth_zero_truncates_every_child() -> anyhow::Result<()> {
    let bridge = RunningBridge::start(Tier::Observe, false);
    let mut conn = bridge.connect()?;

    let resp = roundtrip(
        &mut conn,
        &json!({"id": "t", "cmd": "scene_tree", "args": {"max_depth": 0}, "token": bridge.token}),
    )?;
    assert_eq!(resp["ok"], true);
    assert_eq!(resp["name"], "Root");
    assert_eq!(resp["children"].as_array().map(|c| c.len()), Some(0));
    Ok(())
}

#[test]
fn max_depth_one_includes_direct_children_but_not_grandchildren() -> anyhow::Result<()> {
    let bridge = RunningBridge::start(Tier::Observe, false);
    let mut conn = bridge.connect()?;

    let resp = roundtrip(
        &mut conn,
        &json!({"id": "t", "cmd": "scene_tree", "args": {"max_depth": 1}, "token": bridge.token}),
    )?;
    assert_eq!(resp["ok"], true);
    let children = resp["children"].as_array().cloned().unwrap_or_default();
    assert_eq!(children.len(), 2);
    let hud = children.iter().find(|c| c["name"] == "Hud").expect("Hud node present");
    assert_eq!(hud["children"].as_array().map(|c| c.len()), Some(0));
    Ok(())
}

#[test]
fn max_depth_two_includes_grandchildren() -> anyhow::Result<()> {
    let bridge = RunningBridge::start(Tier::Observe, false);
    let mut conn = bridge.connect()?;

    let resp = roundtrip(
        &mut conn,
        &json!({"id": "t", "cmd": "scene_tree", "args": {"max_depth": 2}, "token": bridge.token}),
    )?;
    assert_eq!(resp["ok"], true);
    let children = resp["children"].as_array().cloned().unwrap_or_default();
    let hud = children.iter().find(|c| c["name"] == "Hud").expect("Hud node present");
    let hud_children = hud["children"].as_array().cloned().unwrap_or_default();
    assert_eq!(hud_children.len(), 1);
    assert_eq!(hud_children[0]["name"], "StartButton");
    Ok(())
}
