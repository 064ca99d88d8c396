//! `agentline send` - the primary client path

use anyhow::{bail, Result};
use serde_json::json;

use agentline_core::config::AgentlineConfig;
use agentline_core::{AgentClient, TaskSender, TaskStatus};

pub async fn run(config: &AgentlineConfig, query: &str, url: Option<&str>) -> Result<()> {
    let url = url
        .map(str::to_string)
        .unwrap_or_else(|| config.orchestrator_url());
    let agent_client = AgentClient::new(&url)
        .with_timeout(config.client.primary_timeout());

    let payload = json!({ "query": query });
    let Some(task) = agent_client.send_task(&payload).await else {
        bail!("No result from {} (unreachable or timed out)", url);
    };

    let text = task.last_text().unwrap_or_default();
    match task.status() {
        TaskStatus::Completed => {
            // Reports are JSON; pretty-print when possible
            match serde_json::from_str::<serde_json::Value>(text) {
                Ok(report) => println!("{}", serde_json::to_string_pretty(&report)?),
                Err(_) => println!("{}", text),
            }
            Ok(())
        }
        status => bail!("Task {} finished {}: {}", task.id(), status, text),
    }
}
