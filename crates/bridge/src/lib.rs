// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An in-process debug bridge a game host embeds to expose a small,
//! capability-gated TCP command surface: observe the running scene,
//! synthesize input, and in tightly scoped builds mutate or eval inside
//! the host.
//!
//! The crate never talks to a concrete engine. Everything it needs from
//! the host is expressed through [`GameHost`]; the host's own
//! implementation of that trait is the only integration point. A host
//! calls [`Bridge::activate`] once at startup, [`Bridge::tick`] once per
//! frame, and [`Bridge::shutdown`] (or just drops it) at teardown.

mod config;
mod diagnostics;
mod dispatcher;
mod error;
mod handlers;
mod host;
mod io_loop;
mod lifecycle;
mod protocol;
mod queues;
mod registry;
mod session;
mod value;
mod waits;

pub use config::BridgeConfig;
pub use diagnostics::{DiagnosticEntry, DiagnosticKind, DiagnosticRing};
pub use error::BridgeError;
pub use host::{
    GameHost, InputEvent, MouseButton, NodeMatch, NodeQuery, NodeRef, RuntimeInfo, SceneNode,
    Screenshot,
};
pub use lifecycle::Bridge;
pub use protocol::{ErrorCode, PROTO};
pub use registry::Tier;
pub use session::{InputMode, Session};
pub use value::Value;
