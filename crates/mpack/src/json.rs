//! JSON rendering of decoded values.
//!
//! Rendering is one-directional: nothing here parses JSON back into a
//! [`Value`].
//!
//! # Value to JSON Mapping
//!
//! | Value   | JSON                                                |
//! |---------|-----------------------------------------------------|
//! | `Nil`   | null                                                |
//! | `Bool`  | true/false                                          |
//! | `Int`   | integer                                             |
//! | `Float` | shortest round-trip decimal at its precision        |
//! | `Str`   | string                                              |
//! | `Bin`   | string holding standard padded base64               |
//! | `Array` | array, one element per line                         |
//! | `Map`   | object, one entry per line; non-string keys quoted  |
//!
//! Containers are pretty-printed with a 2-space step. An empty container
//! keeps the line break: `[\n]` and `{\n}` at the top level.
//!
//! ```
//! use mpack::Value;
//!
//! let value = Value::from(vec![Value::from(1), Value::from("a")]);
//! assert_eq!(value.to_json(), "[\n  1,\n  \"a\"\n]");
//! ```

use std::fmt;

use base64::Engine;
use serde_json::Value as JsonValue;

use crate::value::{Float, Precision, Value};

const INDENT: &str = "  ";

impl Value {
    /// Render as JSON text starting at indentation level 0.
    #[must_use]
    pub fn to_json(&self) -> String {
        self.to_json_indented(0)
    }

    /// Render as JSON text for a value nested `level` containers deep.
    ///
    /// Only arrays and maps use the level: their entries are indented one
    /// step deeper and the closing bracket sits at `level`.
    #[must_use]
    pub fn to_json_indented(&self, level: usize) -> String {
        let mut out = String::new();
        write_json(self, level, &mut out);
        out
    }

    /// Convert into a `serde_json` value.
    #[must_use]
    pub fn to_json_value(&self) -> JsonValue {
        match self {
            Value::Nil => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(n) => JsonValue::Number((*n).into()),
            Value::Float(f) => format_float(*f)
                .parse::<serde_json::Number>()
                .map_or(JsonValue::Null, JsonValue::Number),
            Value::Str(s) => JsonValue::String(s.clone()),
            Value::Bin(b) => JsonValue::String(base64_encode(b)),
            Value::Array(items) => JsonValue::Array(items.iter().map(Value::to_json_value).collect()),
            Value::Map(map) => JsonValue::Object(
                map.iter()
                    .map(|(k, v)| (key_text(k), v.to_json_value()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

fn write_json(value: &Value, level: usize, out: &mut String) {
    match value {
        Value::Nil => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Int(n) => out.push_str(&n.to_string()),
        Value::Float(f) => out.push_str(&format_float(*f)),
        Value::Str(s) => out.push_str(&quote(s)),
        Value::Bin(b) => out.push_str(&quote(&base64_encode(b))),
        Value::Array(items) => {
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                push_indent(out, level + 1);
                write_json(item, level + 1, out);
            }
            close(out, level, !items.is_empty(), ']');
        }
        Value::Map(map) => {
            out.push_str("{\n");
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                push_indent(out, level + 1);
                out.push_str(&quote(&key_text(key)));
                out.push_str(": ");
                write_json(item, level + 1, out);
            }
            close(out, level, !map.is_empty(), '}');
        }
    }
}

fn close(out: &mut String, level: usize, had_entries: bool, bracket: char) {
    if had_entries {
        out.push('\n');
    }
    push_indent(out, level);
    out.push(bracket);
}

fn push_indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}

/// Shortest decimal that round-trips at the float's own precision.
/// Non-finite values have no JSON form and render as `null`.
fn format_float(f: Float) -> String {
    let v = f.value();
    if !v.is_finite() {
        return "null".to_string();
    }
    match f.precision() {
        Precision::F32 => format!("{:?}", v as f32),
        Precision::F64 => format!("{v:?}"),
    }
}

/// Object key for a map key: strings as-is, anything else as its JSON text.
fn key_text(key: &Value) -> String {
    match key {
        Value::Str(s) => s.clone(),
        other => other.to_json(),
    }
}

fn quote(s: &str) -> String {
    JsonValue::from(s).to_string()
}

fn base64_encode(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}
