// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fatal, library-boundary errors. Distinct from [`crate::protocol::ErrorCode`],
//! which is the per-request wire error taxonomy a client sees on the socket.

/// Errors that can prevent the bridge from starting.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write readiness banner: {0}")]
    Banner(#[source] std::io::Error),
}
