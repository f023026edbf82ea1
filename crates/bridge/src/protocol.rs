// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire protocol codec: newline-delimited JSON envelopes.
//!
//! Framing itself (splitting on `\n`, buffering partial reads) lives in
//! [`crate::io_loop`]; this module only parses a single already-isolated
//! line into a request, and serializes a response back into a line.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

/// Protocol literal every request must match if `proto` is present at all.
pub const PROTO: &str = "grb/1";

/// Authoritative wire error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadJson,
    BadProto,
    UnknownCmd,
    BadToken,
    TierDenied,
    DangerDisabled,
    BadArgs,
    NotFound,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadJson => "bad_json",
            Self::BadProto => "bad_proto",
            Self::UnknownCmd => "unknown_cmd",
            Self::BadToken => "bad_token",
            Self::TierDenied => "tier_denied",
            Self::DangerDisabled => "danger_disabled",
            Self::BadArgs => "bad_args",
            Self::NotFound => "not_found",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request as it arrives on the wire, before any validation beyond framing.
#[derive(Debug, Clone, Deserialize)]
struct RawRequest {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    proto: Option<String>,
    #[serde(default)]
    cmd: Option<String>,
    #[serde(default)]
    args: Option<Json>,
    #[serde(default)]
    token: Option<String>,
}

/// A successfully parsed and validated request envelope.
#[derive(Debug, Clone)]
pub struct Request {
    pub id: String,
    pub cmd: String,
    pub args: Map<String, Json>,
    pub token: String,
}

/// The result of parsing one line off the wire: either a usable request, or
/// a parse failure carrying the best-effort `id` and error code the
/// dispatcher should echo back.
#[derive(Debug, Clone)]
pub enum ParsedLine {
    Ok(Request),
    Err { id: String, code: ErrorCode },
}

/// Parse a single line (no embedded newline) into a request or parse error.
///
/// Failure modes:
/// - not a JSON object → `bad_json`
/// - `cmd` missing or empty → `bad_json`
/// - `proto` present but not `grb/1` → `bad_proto`
///
/// `args` that isn't a JSON object is coerced to empty; `token` defaults to
/// empty; unknown fields are ignored (handled implicitly by serde).
pub fn parse_line(line: &str) -> ParsedLine {
    let raw: RawRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(_) => return ParsedLine::Err { id: String::new(), code: ErrorCode::BadJson },
    };

    let id = raw.id.unwrap_or_default();

    let cmd = match raw.cmd {
        Some(c) if !c.is_empty() => c,
        _ => return ParsedLine::Err { id, code: ErrorCode::BadJson },
    };

    if let Some(ref proto) = raw.proto {
        if proto != PROTO {
            return ParsedLine::Err { id, code: ErrorCode::BadProto };
        }
    }

    let args = match raw.args {
        Some(Json::Object(map)) => map,
        _ => Map::new(),
    };

    ParsedLine::Ok(Request { id, cmd, args, token: raw.token.unwrap_or_default() })
}

/// A response envelope ready to be serialized onto the wire.
#[derive(Debug, Clone)]
pub struct Response {
    pub id: String,
    pub body: ResponseBody,
}

#[derive(Debug, Clone)]
pub enum ResponseBody {
    Ok(Map<String, Json>),
    Err { code: ErrorCode, message: String, extra: Map<String, Json> },
}

impl Response {
    /// Build a success response. `data` is flattened into the envelope.
    pub fn ok(id: impl Into<String>, data: Map<String, Json>) -> Self {
        Self { id: id.into(), body: ResponseBody::Ok(data) }
    }

    /// Build an error response with an optional bag of extra fields
    /// (e.g. `tier_required` for `tier_denied`).
    pub fn error(
        id: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        extra: Map<String, Json>,
    ) -> Self {
        Self { id: id.into(), body: ResponseBody::Err { code, message: message.into(), extra } }
    }

    /// Serialize into a single line terminated by `\n`.
    pub fn to_line(&self) -> String {
        let mut obj = Map::new();
        obj.insert("id".to_owned(), Json::String(self.id.clone()));

        match &self.body {
            ResponseBody::Ok(data) => {
                obj.insert("ok".to_owned(), Json::Bool(true));
                for (k, v) in data {
                    obj.insert(k.clone(), v.clone());
                }
            }
            ResponseBody::Err { code, message, extra } => {
                obj.insert("ok".to_owned(), Json::Bool(false));
                let mut error = Map::new();
                error.insert("code".to_owned(), Json::String(code.as_str().to_owned()));
                error.insert("message".to_owned(), Json::String(message.clone()));
                for (k, v) in extra {
                    error.insert(k.clone(), v.clone());
                }
                obj.insert("error".to_owned(), Json::Object(error));
            }
        }

        let mut line = serde_json::to_string(&Json::Object(obj))
            .unwrap_or_else(|_| r#"{"id":"","ok":false,"error":{"code":"internal_error","message":"serialize failure"}}"#.to_owned());
        line.push('\n');
        line
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
