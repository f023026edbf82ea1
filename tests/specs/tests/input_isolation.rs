// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use grb_bridge::{InputEvent, Tier};
use grb_specs::{roundtrip, RunningBridge};
use serde_json::json;

#[test]
fn activation_in_synthetic_mode_turns_on_interception() {
    let bridge = RunningBridge::start(Tier::Input, false);
    assert!(bridge.host.interception_is_active());
}

#[test]
fn untagged_real_input_is_filtered_while_interception_is_active() {
    let bridge = RunningBridge::start(Tier::Input, false);
    let reached = bridge.host.simulate_real_input(InputEvent::KeyPress { keycode: 42 });
    assert!(!reached);
    assert!(bridge.host.real_input_reached().is_empty());
}

#[test]
fn wire_level_click_still_reaches_injected_events_while_interception_is_active() -> anyhow::Result<()> {
    let bridge = RunningBridge::start(Tier::Input, false);
    let mut conn = bridge.connect()?;
    assert!(bridge.host.interception_is_active());

    let resp = roundtrip(
        &mut conn,
        &json!({"id": "c", "cmd": "click", "args": {"x": 5.0, "y": 5.0}, "token": bridge.token}),
    )?;
    assert_eq!(resp["ok"], true);

    std::thread::sleep(Duration::from_millis(50));
    assert!(!bridge.host.injected_events().is_empty());
    Ok(())
}

#[test]
fn dropping_the_bridge_turns_interception_back_off() {
    let host = {
        let bridge = RunningBridge::start(Tier::Input, false);
        assert!(bridge.host.interception_is_active());
        bridge.host.clone()
    };
    assert!(!host.interception_is_active());
}
