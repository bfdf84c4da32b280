//! Normalized HTTP responses

use serde_json::Value;

use crate::common::Result;

/// Response body, parsed when the service declared JSON
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Text(String),
}

/// Result of one request: body plus uninterpreted status code
#[derive(Debug, Clone, PartialEq)]
pub struct HttpOutcome {
    pub body: Body,
    pub status: u16,
}

impl HttpOutcome {
    /// Status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Structured body, if the response was JSON
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            Body::Json(value) => Some(value),
            Body::Text(_) => None,
        }
    }

    /// Raw body, if the response was not JSON
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            Body::Text(text) => Some(text),
            Body::Json(_) => None,
        }
    }

    /// JSON object body, if that is what came back
    pub fn json_object(&self) -> Option<&serde_json::Map<String, Value>> {
        self.json().and_then(Value::as_object)
    }

    /// String field of a JSON object body; empty when missing or not a string
    pub fn json_str(&self, field: &str) -> &str {
        self.json_object()
            .and_then(|obj| obj.get(field))
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// Short name of the body kind, for assertion messages
    pub fn body_kind(&self) -> &'static str {
        match &self.body {
            Body::Json(Value::Object(_)) => "object",
            Body::Json(Value::Array(_)) => "array",
            Body::Json(_) => "json",
            Body::Text(_) => "text",
        }
    }
}

/// Whether a `Content-Type` value belongs to the JSON family
///
/// Matches `application/json` and structured suffixes such as
/// `application/problem+json`, ignoring parameters and case.
pub fn is_json_content_type(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    media_type == "application/json"
        || (media_type.starts_with("application/") && media_type.ends_with("+json"))
}

/// Turn a raw response body into a [`Body`]
///
/// Empty bodies are always text, whatever the declared type.
pub fn normalize_body(content_type: Option<&str>, bytes: &[u8]) -> Result<Body> {
    if !bytes.is_empty() && content_type.is_some_and(is_json_content_type) {
        return Ok(Body::Json(serde_json::from_slice(bytes)?));
    }

    Ok(Body::Text(String::from_utf8_lossy(bytes).into_owned()))
}
