// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command handlers, one module per capability tier. Every
//! handler runs on the engine's main thread and returns a plain result the
//! dispatcher turns into a [`crate::protocol::Response`] — no handler ever
//! touches the wire or the queues directly.

pub mod control;
pub mod danger;
pub mod input;
pub mod observe;

use serde_json::{Map, Value as Json};

use crate::protocol::ErrorCode;
use crate::value::Value;

/// A handler failure: always maps to an error response. Successful
/// handlers just return `Map<String, Json>` directly.
pub struct HandlerError {
    pub code: ErrorCode,
    pub message: String,
    pub extra: Map<String, Json>,
}

impl HandlerError {
    pub fn bad_args(message: impl Into<String>) -> Self {
        Self { code: ErrorCode::BadArgs, message: message.into(), extra: Map::new() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self { code: ErrorCode::NotFound, message: message.into(), extra: Map::new() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self { code: ErrorCode::InternalError, message: message.into(), extra: Map::new() }
    }
}

pub type HandlerResult = Result<Map<String, Json>, HandlerError>;

/// Build a one-entry response map. The common case for handlers that
/// return a single named value.
pub fn single(key: &str, value: Json) -> Map<String, Json> {
    let mut map = Map::new();
    map.insert(key.to_owned(), value);
    map
}

pub fn require_str<'a>(args: &'a Map<String, Json>, key: &str) -> Result<&'a str, HandlerError> {
    args.get(key)
        .and_then(Json::as_str)
        .ok_or_else(|| HandlerError::bad_args(format!("missing or non-string arg `{key}`")))
}

pub fn require_f64(args: &Map<String, Json>, key: &str) -> Result<f64, HandlerError> {
    args.get(key)
        .and_then(Json::as_f64)
        .ok_or_else(|| HandlerError::bad_args(format!("missing or non-numeric arg `{key}`")))
}

pub fn opt_str<'a>(args: &'a Map<String, Json>, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Json::as_str).filter(|s| !s.is_empty())
}

pub fn opt_i64(args: &Map<String, Json>, key: &str) -> Option<i64> {
    args.get(key).and_then(Json::as_i64)
}

pub fn opt_u32(args: &Map<String, Json>, key: &str, default: u32) -> u32 {
    args.get(key).and_then(Json::as_u64).map(|v| v as u32).unwrap_or(default)
}

pub fn opt_usize(args: &Map<String, Json>, key: &str, default: usize) -> usize {
    args.get(key).and_then(Json::as_u64).map(|v| v as usize).unwrap_or(default)
}

/// Read a required two-element `[x, y]` coordinate pair.
pub fn require_point(args: &Map<String, Json>, key: &str) -> Result<(f64, f64), HandlerError> {
    let arr = args
        .get(key)
        .and_then(Json::as_array)
        .ok_or_else(|| HandlerError::bad_args(format!("missing or non-array arg `{key}`")))?;
    if arr.len() != 2 {
        return Err(HandlerError::bad_args(format!("arg `{key}` must have exactly 2 elements")));
    }
    let x = arr[0].as_f64().ok_or_else(|| HandlerError::bad_args(format!("`{key}[0]` must be numeric")))?;
    let y = arr[1].as_f64().ok_or_else(|| HandlerError::bad_args(format!("`{key}[1]` must be numeric")))?;
    Ok((x, y))
}

/// Read an optional array argument of values, defaulting to empty.
pub fn opt_value_array(args: &Map<String, Json>, key: &str) -> Vec<Value> {
    args.get(key)
        .and_then(Json::as_array)
        .map(|arr| arr.iter().map(Value::from_json).collect())
        .unwrap_or_default()
}
