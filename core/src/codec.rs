//! JSON body codec and the response variant.
//!
//! # Design
//! TestRail answers with a JSON object for most endpoints, a JSON array for
//! list endpoints, raw bytes for attachment downloads, and nothing at all for
//! some writes. `ApiResponse` names those four cases so the convenience
//! operations can match on the one they expect instead of poking at an
//! untyped value.

use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::error::TransportError;

/// A parsed TestRail response.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Object(Map<String, Value>),
    Array(Vec<Value>),
    /// An attachment was written to this path.
    File(PathBuf),
    /// 200 with an empty body.
    Empty,
}

impl ApiResponse {
    fn kind(&self) -> &'static str {
        match self {
            ApiResponse::Object(_) => "object",
            ApiResponse::Array(_) => "array",
            ApiResponse::File(_) => "file",
            ApiResponse::Empty => "empty body",
        }
    }

    /// Borrow the object, if this response is one.
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            ApiResponse::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Take the object. An empty body counts as an empty object.
    pub fn into_object(self) -> Result<Map<String, Value>, TransportError> {
        match self {
            ApiResponse::Object(map) => Ok(map),
            ApiResponse::Empty => Ok(Map::new()),
            other => Err(TransportError::UnexpectedShape {
                expected: "object",
                found: other.kind(),
            }),
        }
    }

    pub fn into_array(self) -> Result<Vec<Value>, TransportError> {
        match self {
            ApiResponse::Array(items) => Ok(items),
            other => Err(TransportError::UnexpectedShape {
                expected: "array",
                found: other.kind(),
            }),
        }
    }

    pub fn into_file(self) -> Result<PathBuf, TransportError> {
        match self {
            ApiResponse::File(path) => Ok(path),
            other => Err(TransportError::UnexpectedShape {
                expected: "file",
                found: other.kind(),
            }),
        }
    }
}

/// Serialize a request body as UTF-8 JSON.
pub fn encode_json(value: &Value) -> Result<Vec<u8>, TransportError> {
    Ok(serde_json::to_vec(value)?)
}

/// Parse a response body. Blank text yields `ApiResponse::Empty`.
pub fn decode_json(text: &str) -> Result<ApiResponse, TransportError> {
    if text.trim().is_empty() {
        return Ok(ApiResponse::Empty);
    }
    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) => Ok(ApiResponse::Object(map)),
        Value::Array(items) => Ok(ApiResponse::Array(items)),
        Value::Null => Err(scalar("null")),
        Value::Bool(_) => Err(scalar("boolean")),
        Value::Number(_) => Err(scalar("number")),
        Value::String(_) => Err(scalar("string")),
    }
}

fn scalar(found: &'static str) -> TransportError {
    TransportError::UnexpectedShape {
        expected: "object or array",
        found,
    }
}

/// Read an integer id, accepting both `42` and `"42"`.
pub fn id_field(map: &Map<String, Value>, key: &str) -> Result<u64, TransportError> {
    let value = map
        .get(key)
        .ok_or_else(|| TransportError::MissingField(key.to_string()))?;
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or(TransportError::UnexpectedShape {
        expected: "integer id",
        found: json_kind(value),
    })
}

/// Read a field as text. Strings come back verbatim, other values as JSON.
pub fn text_field(map: &Map<String, Value>, key: &str) -> Result<String, TransportError> {
    match map.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Null) | None => Err(TransportError::MissingField(key.to_string())),
        Some(other) => Ok(other.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
