//! Tool registry

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use super::{Tool, ToolError, ToolInfo};

#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub async fn register(&self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        debug!("Registering tool: {}", name);
        self.tools.write().await.insert(name, tool);
    }

    /// Registered tools, sorted by name
    pub async fn list(&self) -> Vec<ToolInfo> {
        let tools = self.tools.read().await;
        let mut infos: Vec<ToolInfo> = tools
            .values()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// Dispatch by name
    pub async fn call(&self, name: &str, params: Value) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tool.call(params).await
    }
}
