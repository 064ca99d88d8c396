//! Stand-in stage agent
//!
//! Reflects its request back under the agent's name. Lets a full pipeline run
//! locally without the real content-producing agents behind each stage.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Agent, AgentError};

pub struct EchoAgent {
    name: String,
    description: String,
    capabilities: Vec<String>,
}

impl EchoAgent {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            description: format!("Stand-in agent for the '{}' stage", name),
            capabilities: vec!["echo".to_string()],
            name,
        }
    }
}

#[async_trait]
impl Agent for EchoAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn capabilities(&self) -> Vec<String> {
        self.capabilities.clone()
    }

    fn skills(&self) -> Vec<(String, String)> {
        let description = "Returns the received request under the agent's name.";
        vec![("echo".to_string(), description.to_string())]
    }

    async fn execute(&self, payload: Value) -> Result<Value, AgentError> {
        if payload.get("query").and_then(Value::as_str).is_none() {
            return Err(AgentError::InvalidInput(
                "request has no 'query' field".to_string(),
            ));
        }

        Ok(json!({
            "agent": self.name,
            "received": payload,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_reflects_request() {
        let agent = EchoAgent::new("data_gathering");
        let result = agent
            .execute(json!({"query": "Analyze AAPL"}))
            .await
            .unwrap();

        assert_eq!(result["agent"], "data_gathering");
        assert_eq!(result["received"]["query"], "Analyze AAPL");
    }

    #[tokio::test]
    async fn test_echo_rejects_missing_query() {
        let agent = EchoAgent::new("report_generation");
        let err = agent.execute(json!({"data": 1})).await.unwrap_err();
        assert!(matches!(err, AgentError::InvalidInput(_)));
    }
}
