//! HTTP client for tool servers

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use super::ToolInfo;
use crate::constants::client;

#[derive(Deserialize)]
struct CallResponse {
    result: Value,
}

#[derive(Deserialize)]
struct ListResponse {
    tools: Vec<ToolInfo>,
}

/// Calls tools on a remote tool server. Failures are logged and yield `None`.
#[derive(Debug, Clone)]
pub struct ToolClient {
    base_url: String,
    http: reqwest::Client,
    timeout: Duration,
}

impl ToolClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            timeout: Duration::from_secs(client::STAGE_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn call(&self, tool: &str, params: Value) -> Option<Value> {
        let url = format!("{}/call", self.base_url);
        let result: Result<CallResponse, reqwest::Error> = async {
            self.http
                .post(&url)
                .timeout(self.timeout)
                .json(&json!({"tool": tool, "params": params}))
                .send()
                .await?
                .error_for_status()?
                .json()
                .await
        }
        .await;

        match result {
            Ok(response) => Some(response.result),
            Err(e) => {
                warn!(url = %url, tool, "Tool call failed: {}", e);
                None
            }
        }
    }

    pub async fn list(&self) -> Option<Vec<ToolInfo>> {
        let url = format!("{}/tools", self.base_url);
        let result: Result<ListResponse, reqwest::Error> = async {
            self.http
                .get(&url)
                .timeout(self.timeout)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await
        }
        .await;

        match result {
            Ok(response) => Some(response.tools),
            Err(e) => {
                warn!(url = %url, "Tool listing failed: {}", e);
                None
            }
        }
    }
}
