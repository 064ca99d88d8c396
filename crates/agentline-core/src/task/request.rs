//! Send-task request envelope

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::message::Message;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("initial message has no content parts")]
    EmptyMessage,
}

/// Caller identity attached to inter-agent requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMetadata {
    pub sender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendTaskRequest {
    pub message: Message,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RequestMetadata>,
}

impl SendTaskRequest {
    /// Wrap a structured payload as a single user text part.
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            message: Message::user(payload.to_string()),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Option<RequestMetadata>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Reject requests whose initial message carries no text part.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.message.first_text().is_none() {
            return Err(RequestError::EmptyMessage);
        }
        Ok(())
    }
}
