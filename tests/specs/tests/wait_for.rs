// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::{BufRead, BufReader, Write};
use std::time::Duration;

use grb_bridge::Tier;
use grb_specs::{roundtrip, RunningBridge};
use serde_json::json;

#[test]
fn wait_for_matches_once_another_client_changes_the_property() -> anyhow::Result<()> {
    let bridge = RunningBridge::start(Tier::Control, false);
    let waiter = bridge.connect()?;
    let mut waiter_writer = waiter.try_clone()?;
    let mut waiter_reader = BufReader::new(waiter);

    let request = json!({
        "id": "w",
        "cmd": "wait_for",
        "args": {"node": "/root/Player", "property": "health", "value": "50", "timeout_ms": 2000},
        "token": bridge.token,
    });
    let mut line = serde_json::to_string(&request)?;
    line.push('\n');
    waiter_writer.write_all(line.as_bytes())?;

    // A second client changes the watched property shortly after.
    let token = bridge.token.clone();
    let setter_conn = bridge.connect()?;
    let handle = std::thread::spawn(move || -> anyhow::Result<()> {
        std::thread::sleep(Duration::from_millis(150));
        let mut conn = setter_conn;
        roundtrip(
            &mut conn,
            &json!({
                "id": "s", "cmd": "set_property",
                "args": {"node": "/root/Player", "property": "health", "value": 50},
                "token": token,
            }),
        )?;
        Ok(())
    });

    waiter_writer.set_read_timeout(Some(Duration::from_secs(5)))?;
    let mut response_line = String::new();
    waiter_reader.read_line(&mut response_line)?;
    let resp: serde_json::Value = serde_json::from_str(response_line.trim())?;

    handle.join().map_err(|_| anyhow::anyhow!("setter thread panicked"))??;

    assert_eq!(resp["ok"], true);
    assert_eq!(resp["matched"], true);
    assert!(resp["elapsed_ms"].as_u64().unwrap_or(u64::MAX) <= 2000);
    Ok(())
}

#[test]
fn wait_for_times_out_and_reports_last_value() -> anyhow::Result<()> {
    let bridge = RunningBridge::start(Tier::Observe, false);
    let mut conn = bridge.connect()?;

    let resp = roundtrip(
        &mut conn,
        &json!({
            "id": "w2",
            "cmd": "wait_for",
            "args": {"node": "/root/Player", "property": "health", "value": "999", "timeout_ms": 300},
            "token": bridge.token,
        }),
    )?;

    assert_eq!(resp["ok"], true);
    assert_eq!(resp["matched"], false);
    assert!(resp["elapsed_ms"].as_u64().unwrap_or(0) >= 300);
    assert_eq!(resp["last_value"], "100");
    Ok(())
}

#[test]
fn wait_for_on_unknown_node_resolves_not_found() -> anyhow::Result<()> {
    let bridge = RunningBridge::start(Tier::Observe, false);
    let mut conn = bridge.connect()?;

    let resp = roundtrip(
        &mut conn,
        &json!({
            "id": "w3",
            "cmd": "wait_for",
            "args": {"node": "/root/Nonexistent", "property": "x", "value": "1", "timeout_ms": 500},
            "token": bridge.token,
        }),
    )?;

    assert_eq!(resp["ok"], false);
    assert_eq!(resp["error"]["code"], "not_found");
    Ok(())
}
