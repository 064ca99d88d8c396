//! Agent contract
//!
//! An agent is an opaque unit of computation: it takes a structured request and
//! produces a structured result or fails with a tagged [`AgentError`]. Task
//! managers wrap agents; they never look inside them.

mod echo;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use echo::EchoAgent;

/// A unit of computation reachable through a task manager.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Stable agent name, used in logs, task metadata, and discovery.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn version(&self) -> &str {
        "1.0.0"
    }

    /// Capability tags advertised for discovery.
    fn capabilities(&self) -> Vec<String> {
        Vec::new()
    }

    /// `(name, description)` pairs listed as skills on the discovery card.
    fn skills(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Run the agent on a normalized structured request.
    async fn execute(&self, payload: Value) -> Result<Value, AgentError>;
}

/// Failure raised by an agent's `execute`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    Execution(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Discriminant of [`AgentError`], serialized for logs and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentErrorKind {
    InvalidInput,
    Execution,
    Transport,
    Timeout,
    Internal,
}

impl AgentError {
    pub fn kind(&self) -> AgentErrorKind {
        match self {
            AgentError::InvalidInput(_) => AgentErrorKind::InvalidInput,
            AgentError::Execution(_) => AgentErrorKind::Execution,
            AgentError::Transport(_) => AgentErrorKind::Transport,
            AgentError::Timeout(_) => AgentErrorKind::Timeout,
            AgentError::Internal(_) => AgentErrorKind::Internal,
        }
    }

    /// The message without the kind prefix.
    pub fn detail(&self) -> &str {
        match self {
            AgentError::InvalidInput(msg)
            | AgentError::Execution(msg)
            | AgentError::Transport(msg)
            | AgentError::Timeout(msg)
            | AgentError::Internal(msg) => msg,
        }
    }
}

impl AgentErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentErrorKind::InvalidInput => "invalid_input",
            AgentErrorKind::Execution => "execution",
            AgentErrorKind::Transport => "transport",
            AgentErrorKind::Timeout => "timeout",
            AgentErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for AgentErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
