//! Task record and its status state machine
//!
//! ```text
//!            complete()
//!  WORKING ─────────────► COMPLETED
//!     │
//!     └────── fail() ───► ERRORED
//! ```
//!
//! Terminal states have no outgoing transitions. `messages[0]` is always the
//! request; later messages are only ever appended.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::message::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    Working,
    Completed,
    Errored,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Working)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Working => "WORKING",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Errored => "ERRORED",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid task transition {from} -> {to}")]
pub struct TransitionError {
    pub from: TaskStatus,
    pub to: TaskStatus,
}

/// Agent identity stamped on each task by its manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMetadata {
    pub agent_name: String,
    pub agent_version: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: String,
    status: TaskStatus,
    messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<TaskMetadata>,
}

impl Task {
    /// Fresh `WORKING` task holding the request message
    pub fn new(initial: Message) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            status: TaskStatus::Working,
            messages: vec![initial],
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: TaskMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn metadata(&self) -> Option<&TaskMetadata> {
        self.metadata.as_ref()
    }

    /// Append the serialized result and move to `COMPLETED`.
    pub fn complete(&mut self, result_text: impl Into<String>) -> Result<(), TransitionError> {
        self.finish(TaskStatus::Completed, Message::agent(result_text))
    }

    /// Append the failure description and move to `ERRORED`.
    pub fn fail(&mut self, error_text: impl Into<String>) -> Result<(), TransitionError> {
        self.finish(TaskStatus::Errored, Message::agent(error_text))
    }

    fn finish(&mut self, to: TaskStatus, outcome: Message) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError {
                from: self.status,
                to,
            });
        }
        self.messages.push(outcome);
        self.status = to;
        Ok(())
    }

    /// Text of the most recent message
    pub fn last_text(&self) -> Option<&str> {
        self.messages.last().and_then(Message::first_text)
    }

    /// Result text, only when the task completed
    pub fn result_text(&self) -> Option<&str> {
        match self.status {
            TaskStatus::Completed => self.last_text(),
            _ => None,
        }
    }
}
