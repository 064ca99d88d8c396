//! Built-in tools served by `agentline serve tools`

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_params, Tool, ToolError};
use crate::config::StageConfig;

/// Returns its parameters unchanged
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Returns the given parameters unchanged."
    }

    async fn call(&self, params: Value) -> Result<Value, ToolError> {
        Ok(params)
    }
}

/// Looks up the configured pipeline stages
pub struct StageDirectoryTool {
    stages: Vec<StageConfig>,
}

#[derive(Deserialize)]
struct StageDirectoryParams {
    #[serde(default)]
    name: Option<String>,
}

impl StageDirectoryTool {
    pub fn new(stages: Vec<StageConfig>) -> Self {
        Self { stages }
    }
}

#[async_trait]
impl Tool for StageDirectoryTool {
    fn name(&self) -> &str {
        "stage_directory"
    }

    fn description(&self) -> &str {
        "Lists pipeline stages and their endpoints, or looks up one stage by name."
    }

    async fn call(&self, params: Value) -> Result<Value, ToolError> {
        let params: StageDirectoryParams = if params.is_null() {
            StageDirectoryParams { name: None }
        } else {
            parse_params(params)?
        };

        match params.name {
            Some(name) => self
                .stages
                .iter()
                .find(|s| s.name == name)
                .map(|s| json!({"name": s.name, "url": s.url}))
                .ok_or_else(|| ToolError::Failed(format!("unknown stage '{}'", name))),
            None => Ok(Value::Array(
                self.stages
                    .iter()
                    .map(|s| json!({"name": s.name, "url": s.url}))
                    .collect(),
            )),
        }
    }
}
