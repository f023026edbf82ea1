// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Value marshalling for heterogeneous engine types.
//!
//! Engine-native vector/color/path types vary across hosts, so a single
//! rule is applied uniformly wherever a handler's result crosses into
//! JSON: primitives pass through, arrays/mappings marshal element-wise,
//! and anything else degrades to its string form. The same [`Value`] type
//! backs `get_property`, `call_method.result`, and `wait_for.last_value`,
//! and its `Display` impl is the single stringifier `wait_for`'s
//! string-equality check relies on.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value as Json};

/// An engine value marshalled into the bridge's wire representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// Anything the host capability layer can't express more precisely
    /// (engine vectors, colors, resource paths, ...) — degrades to its
    /// string form.
    Opaque(String),
}

impl Value {
    pub fn null() -> Self {
        Value::Opaque("null".to_owned())
    }

    /// Convert to the JSON representation sent on the wire.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            Value::Float(f) => {
                serde_json::Number::from_f64(*f).map(Json::Number).unwrap_or(Json::Null)
            }
            Value::String(s) => Json::String(s.clone()),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => {
                let mut obj = Map::new();
                for (k, v) in map {
                    obj.insert(k.clone(), v.to_json());
                }
                Json::Object(obj)
            }
            Value::Opaque(s) => Json::String(s.clone()),
        }
    }

    /// Build a value from an already-parsed JSON value (e.g. a `set_property`
    /// argument). Keys are coerced to string; unrepresentable JSON numbers
    /// fall back to their textual form rather than panicking.
    pub fn from_json(json: &Json) -> Self {
        match json {
            Json::Null => Value::null(),
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    Value::Opaque(n.to_string())
                }
            }
            Json::String(s) => Value::String(s.clone()),
            Json::Array(items) => Value::Array(items.iter().map(Value::from_json).collect()),
            Json::Object(map) => {
                let mut out = BTreeMap::new();
                for (k, v) in map {
                    out.insert(k.clone(), Value::from_json(v));
                }
                Value::Map(out)
            }
        }
    }
}

impl fmt::Display for Value {
    /// The stringifier `wait_for` compares against. Chosen to be stable and
    /// engine-independent: primitives print their natural textual form,
    /// containers print as compact JSON, matching how `get_property` and
    /// `call_method.result` already render the same value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => f.write_str(s),
            Value::Opaque(s) => f.write_str(s),
            Value::Array(_) | Value::Map(_) => {
                write!(f, "{}", self.to_json())
            }
        }
    }
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;
