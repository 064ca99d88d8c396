//! Tool servers
//!
//! A tool server is a name -> tool registry exposed over HTTP. The pipeline
//! treats it as one more collaborator reachable through [`ToolClient`].

pub mod builtin;
mod client;
mod registry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use client::ToolClient;
pub use registry::ToolRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("Tool {0} not found")]
    NotFound(String),
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
    #[error("{0}")]
    Failed(String),
}

/// Name and description advertised by `GET /tools`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    async fn call(&self, params: Value) -> Result<Value, ToolError>;
}

/// Parse tool parameters, mapping failures to `InvalidParams`
pub fn parse_params<T: serde::de::DeserializeOwned>(params: Value) -> Result<T, ToolError> {
    serde_json::from_value(params)
        .map_err(|e| ToolError::InvalidParams(e.to_string()))
}
