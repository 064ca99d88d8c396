//! Request payload normalization
//!
//! The initial message text is either a serialized JSON object or arbitrary
//! text. Anything that is not a JSON object is coerced into `{"query": text}`
//! so agents always receive a structured request.

use serde_json::{json, Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Text parsed to a JSON object
    Structured(Map<String, Value>),
    /// Text that is not a JSON object
    RawText(String),
}

impl Payload {
    pub fn from_text(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Payload::Structured(map),
            // A serialized JSON string carries the query itself
            Ok(Value::String(inner)) => Payload::RawText(inner),
            _ => Payload::RawText(text.to_string()),
        }
    }

    /// Normalized structured request handed to the agent
    pub fn into_request(self) -> Value {
        match self {
            Payload::Structured(map) => Value::Object(map),
            Payload::RawText(text) => json!({ "query": text }),
        }
    }
}
