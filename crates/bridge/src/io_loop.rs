// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! I/O loop: the single background worker that owns the TCP
//! listener and its one live client. Blocking socket calls are avoided by
//! putting both listener and client sockets in non-blocking mode and
//! polling `WouldBlock`, the same non-blocking-plus-retry shape the PTY
//! backend uses for its raw fd reads/writes, just without an async
//! executor underneath it — this worker is the one thread in the process
//! allowed to block at all, and even it only blocks for a 1 ms sleep.

use std::io::{self, ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{error, warn};

use crate::protocol::{parse_line, PROTO};
use crate::queues::{InboundQueue, OutboundQueue};
use crate::session::Session;

/// Read buffer is dropped (and the connection closed) past this size
/// without a line terminator — a malformed-client safety cap.
const MAX_BUFFER_BYTES: usize = 10 * 1024 * 1024;

const POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Serialize)]
struct ReadinessBanner<'a> {
    proto: &'a str,
    port: u16,
    token: &'a str,
    tier_default: u8,
    input_mode: &'a str,
}

/// Write the readiness banner to `out`: the launcher's sole
/// discovery mechanism, so this is the only thing the worker writes to
/// stdout rather than the socket.
fn write_banner(out: &mut impl Write, session: &Session) -> io::Result<()> {
    let banner = ReadinessBanner {
        proto: PROTO,
        port: session.bound_port,
        token: &session.token,
        tier_default: session.session_tier.as_u8(),
        input_mode: session.input_mode.as_str(),
    };
    let json = serde_json::to_string(&banner).unwrap_or_else(|_| "{}".to_owned());
    writeln!(out, "GDRB_READY:{json}")?;
    out.flush()
}

struct ActiveClient {
    stream: TcpStream,
    read_buf: Vec<u8>,
}

/// Bind the listener on loopback, resolving port 0 to whatever the kernel
/// assigns. Always binds `127.0.0.1` — never
/// configurable to any other address.
pub fn bind(port: u16) -> io::Result<(TcpListener, u16)> {
    let listener = TcpListener::bind(("127.0.0.1", port))?;
    let resolved = listener.local_addr()?.port();
    Ok((listener, resolved))
}

/// Runs until `shutdown` is observed set. Binds the listener, emits the
/// readiness banner, then loops: accept (preempting any existing client),
/// read, parse, write, sleep.
pub fn run(
    listener: TcpListener,
    session: Arc<Session>,
    inbound: Arc<InboundQueue>,
    outbound: Arc<OutboundQueue>,
    shutdown: Arc<AtomicBool>,
) {
    if let Err(e) = listener.set_nonblocking(true) {
        error!("failed to set listener non-blocking: {e}");
        return;
    }

    let mut stdout = io::stdout();
    if let Err(e) = write_banner(&mut stdout, &session) {
        error!("failed to write readiness banner: {e}");
        return;
    }

    let mut client: Option<ActiveClient> = None;

    while !shutdown.load(Ordering::Relaxed) {
        accept_new_client(&listener, &mut client);

        if let Some(active) = client.as_mut() {
            if !read_available(active, &inbound) {
                client = None;
            }
        }

        if let Some(active) = client.as_mut() {
            if !write_pending(active, &outbound) {
                client = None;
            }
        }

        std::thread::sleep(POLL_INTERVAL);
    }
}

/// At most one live client: a new connection always preempts
/// whatever was previously active.
fn accept_new_client(listener: &TcpListener, client: &mut Option<ActiveClient>) {
    match listener.accept() {
        Ok((stream, _addr)) => {
            if let Err(e) = stream.set_nonblocking(true) {
                warn!("failed to set accepted stream non-blocking: {e}");
                return;
            }
            *client = Some(ActiveClient { stream, read_buf: Vec::new() });
        }
        Err(e) if e.kind() == ErrorKind::WouldBlock => {}
        Err(e) => warn!("accept failed: {e}"),
    }
}

/// Returns `false` if the connection should be dropped.
fn read_available(active: &mut ActiveClient, inbound: &InboundQueue) -> bool {
    let mut chunk = [0u8; 8192];
    loop {
        match active.stream.read(&mut chunk) {
            Ok(0) => return false, // peer closed
            Ok(n) => {
                active.read_buf.extend_from_slice(&chunk[..n]);
                if active.read_buf.len() > MAX_BUFFER_BYTES {
                    warn!("client read buffer exceeded {MAX_BUFFER_BYTES} bytes without a line terminator");
                    return false;
                }
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => break,
            Err(e) => {
                warn!("read failed: {e}");
                return false;
            }
        }
    }

    drain_complete_lines(active, inbound);
    true
}

fn drain_complete_lines(active: &mut ActiveClient, inbound: &InboundQueue) {
    loop {
        let Some(pos) = active.read_buf.iter().position(|&b| b == b'\n') else { break };
        let line_bytes: Vec<u8> = active.read_buf.drain(..=pos).collect();
        let line = String::from_utf8_lossy(&line_bytes[..line_bytes.len() - 1]);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        inbound.push(parse_line(line));
    }
}

/// Returns `false` if the connection should be dropped.
fn write_pending(active: &mut ActiveClient, outbound: &OutboundQueue) -> bool {
    for line in outbound.drain() {
        if let Err(e) = write_all_blocking(&mut active.stream, line.as_bytes()) {
            warn!("write failed: {e}");
            return false;
        }
    }
    true
}

/// Write a complete line before returning, retrying on `WouldBlock`.
fn write_all_blocking(stream: &mut TcpStream, mut data: &[u8]) -> io::Result<()> {
    while !data.is_empty() {
        match stream.write(data) {
            Ok(0) => return Err(io::Error::new(ErrorKind::WriteZero, "write returned 0")),
            Ok(n) => data = &data[n..],
            Err(e) if e.kind() == ErrorKind::WouldBlock => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "io_loop_tests.rs"]
mod tests;
