//! Agent client
//!
//! Issues send-task requests to a remote agent endpoint and returns the
//! finished task. Every transport failure (refused connection, timeout,
//! non-2xx status, undecodable body) is logged and surfaced as `None` so
//! callers can tell "reachable and executed" apart from "unreachable".

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::card::AgentCard;
use crate::config::ClientSettings;
use crate::constants::{client, server};
use crate::retry::{is_retryable_status, with_retry, IsRetryable, RetryConfig};
use crate::task::{RequestMetadata, SendTaskRequest, Task};

/// Anything that can run a task on a downstream agent
#[async_trait]
pub trait TaskSender: Send + Sync {
    /// Address of the downstream agent
    fn target(&self) -> &str;

    /// Send `payload` as a task. `None` means no result was obtained.
    async fn send_task(&self, payload: &Value) -> Option<Task>;
}

#[derive(Debug, Error)]
enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

impl IsRetryable for ClientError {
    fn is_retryable(&self) -> bool {
        match self {
            ClientError::Http(e) => !e.is_decode() && !e.is_builder(),
            ClientError::Status { status, .. } => is_retryable_status(*status),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AgentClient {
    url: String,
    http: reqwest::Client,
    timeout: Duration,
    retry: RetryConfig,
    metadata: Option<RequestMetadata>,
}

impl AgentClient {
    /// Client for the primary caller path: long timeout, single attempt.
    pub fn new(url: &str) -> Self {
        Self {
            url: normalize_url(url),
            http: reqwest::Client::new(),
            timeout: Duration::from_secs(client::PRIMARY_TIMEOUT_SECS),
            retry: RetryConfig::none(),
            metadata: None,
        }
    }

    /// Client for inter-agent calls, using the configured stage timeout and retry.
    pub fn for_stage(url: &str, settings: &ClientSettings) -> Self {
        Self::new(url)
            .with_timeout(settings.stage_timeout())
            .with_retry(settings.stage_retry())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Caller identity attached to every request
    pub fn with_metadata(mut self, metadata: RequestMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch the remote discovery card. `None` when unreachable or malformed.
    pub async fn fetch_card(&self) -> Option<AgentCard> {
        let card_url = format!("{}{}", self.url.trim_end_matches('/'), server::CARD_PATH);
        let result: Result<AgentCard, reqwest::Error> = async {
            let response = self
                .http
                .get(&card_url)
                .timeout(Duration::from_secs(client::CARD_TIMEOUT_SECS))
                .send()
                .await?
                .error_for_status()?;
            response.json::<AgentCard>().await
        }
        .await;

        match result {
            Ok(card) => Some(card),
            Err(e) => {
                debug!(url = %card_url, "Agent card unavailable: {}", e);
                None
            }
        }
    }

    async fn post_once(&self, request: &SendTaskRequest) -> Result<Task, ClientError> {
        let response = self
            .http
            .post(&self.url)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<Task>().await?)
    }
}

#[async_trait]
impl TaskSender for AgentClient {
    fn target(&self) -> &str {
        &self.url
    }

    async fn send_task(&self, payload: &Value) -> Option<Task> {
        let request = SendTaskRequest::from_payload(payload)
            .with_metadata(self.metadata.clone());
        let attempt = || self.post_once(&request);

        match with_retry(&self.retry, &self.url, attempt).await {
            Ok(task) => {
                debug!(
                    url = %self.url,
                    task_id = %task.id(),
                    status = %task.status(),
                    "Task returned"
                );
                Some(task)
            }
            Err(e) => {
                warn!(url = %self.url, "Task failed: {}", e);
                None
            }
        }
    }
}

/// Endpoints are addressed at their root path with a trailing slash.
fn normalize_url(url: &str) -> String {
    format!("{}/", url.trim_end_matches('/'))
}
