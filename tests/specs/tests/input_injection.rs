// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use grb_bridge::{InputEvent, MouseButton, Tier};
use grb_specs::{roundtrip, RunningBridge};
use serde_json::json;

#[test]
fn gesture_pinch_with_nested_params_injects_a_pinch_event() -> anyhow::Result<()> {
    let bridge = RunningBridge::start(Tier::Input, false);
    let mut conn = bridge.connect()?;

    let resp = roundtrip(
        &mut conn,
        &json!({
            "id": "g", "cmd": "gesture",
            "args": {"type": "pinch", "params": {"center": [480.0, 270.0], "scale": 1.2}},
            "token": bridge.token,
        }),
    )?;
    assert_eq!(resp["ok"], true);

    std::thread::sleep(Duration::from_millis(50));
    let events = bridge.host.injected_events();
    assert!(events.iter().any(|e| matches!(
        e,
        InputEvent::GesturePinch { scale, .. } if *scale > 1.0
    )));
    Ok(())
}

#[test]
fn click_injects_motion_press_and_a_deferred_release() -> anyhow::Result<()> {
    let bridge = RunningBridge::start(Tier::Input, false);
    let mut conn = bridge.connect()?;

    let resp = roundtrip(
        &mut conn,
        &json!({"id": "c", "cmd": "click", "args": {"x": 10.0, "y": 20.0}, "token": bridge.token}),
    )?;
    assert_eq!(resp["ok"], true);

    // The release fires on a subsequent tick, not synchronously with the
    // handler call — give the background ticker a chance to run it.
    std::thread::sleep(Duration::from_millis(50));
    let events = bridge.host.injected_events();
    assert!(events.iter().any(|e| matches!(e, InputEvent::MousePress { button: MouseButton::Left, .. })));
    assert!(events.iter().any(|e| matches!(e, InputEvent::MouseRelease { button: MouseButton::Left, .. })));
    Ok(())
}

#[test]
fn synthetic_mode_never_warps_the_os_cursor() -> anyhow::Result<()> {
    // `warp_os_cursor` is a no-op on TestHost regardless of call; this test
    // only confirms `click` succeeds in the default (synthetic) input mode
    // without requiring OS-level cursor plumbing.
    let bridge = RunningBridge::start(Tier::Input, false);
    let mut conn = bridge.connect()?;
    let resp = roundtrip(
        &mut conn,
        &json!({"id": "c2", "cmd": "click", "args": {"x": 1.0, "y": 1.0}, "token": bridge.token}),
    )?;
    assert_eq!(resp["ok"], true);
    Ok(())
}
