// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

mod fake_host;

use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use grb_bridge::{Bridge, BridgeConfig, InputMode, Tier};
use tracing::info;
use tracing_subscriber::prelude::*;

use fake_host::FakeGameHost;

/// Stand-in game process that embeds `grb-bridge` against an in-memory
/// scene graph, for manual poking and for the black-box integration tests.
#[derive(Parser, Debug)]
#[command(name = "grb-harness")]
struct Args {
    /// Port to bind; 0 lets the OS choose (printed in the readiness banner).
    #[arg(long, env = "GDRB_PORT", default_value_t = 0)]
    port: u16,

    /// Shared token clients must present; a random one is generated if empty.
    #[arg(long, env = "GDRB_TOKEN", default_value = "")]
    token: String,

    /// Capability tier granted to this session (0-3).
    #[arg(long, env = "GDRB_TIER", default_value_t = 1)]
    tier: i64,

    /// Enable the Danger tier's `eval` command.
    #[arg(long, env = "GDRB_ENABLE_DANGER", default_value_t = false)]
    enable_danger: bool,

    /// "synthetic" (default) or "os".
    #[arg(long, env = "GDRB_INPUT_MODE", default_value = "synthetic")]
    input_mode: String,

    /// Number of frame ticks to run before exiting; 0 runs forever.
    #[arg(long, default_value_t = 0)]
    max_frames: u64,
}

fn main() {
    let args = Args::parse();

    let config = BridgeConfig::from_lookup(|key| match key {
        "GDRB_PORT" => Some(args.port.to_string()),
        "GDRB_TOKEN" => Some(args.token.clone()),
        "GDRB_TIER" => Some(args.tier.to_string()),
        "GDRB_ENABLE_DANGER" => Some(if args.enable_danger { "1".into() } else { "0".into() }),
        "GDRB_INPUT_MODE" => Some(args.input_mode.clone()),
        _ => None,
    });
    let _ = Tier::clamp(args.tier);
    let _ = InputMode::from_env_str(&args.input_mode);

    let fake_host = Arc::new(FakeGameHost::new());
    let host: Arc<dyn grb_bridge::GameHost> = fake_host.clone();

    let Some(mut bridge) = Bridge::activate_with(host, config) else {
        eprintln!("bridge did not activate (build-feature or environment gate not satisfied)");
        std::process::exit(1);
    };

    // The bridge only exposes its diagnostic sink; installing it alongside
    // the host's own fmt layer is the caller's job, not the library's.
    let ring = bridge.diagnostics();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(ring)
        .init();

    info!(port = bridge.session().bound_port, "grb-harness running");

    let frame_interval = Duration::from_millis(16);
    let mut frames: u64 = 0;
    loop {
        let frame_start = Instant::now();
        bridge.tick();
        frames += 1;
        if fake_host.quit_was_requested() {
            break;
        }
        if args.max_frames != 0 && frames >= args.max_frames {
            break;
        }
        if let Some(remaining) = frame_interval.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(remaining);
        }
    }

    bridge.shutdown();
}
