//! `agentline call` - invoke or list tools

use anyhow::{bail, Context, Result};
use serde_json::Value;

use agentline_core::constants::server;
use agentline_core::tools::ToolClient;

pub async fn run(tool: &str, params: &str, url: Option<&str>) -> Result<()> {
    let params: Value = serde_json::from_str(params)
        .context("--params must be valid JSON")?;
    let url = tool_server_url(url);

    match ToolClient::new(&url).call(tool, params).await {
        Some(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        None => bail!("Tool '{}' returned no result from {}", tool, url),
    }
}

pub async fn list(url: Option<&str>) -> Result<()> {
    let url = tool_server_url(url);

    let Some(tools) = ToolClient::new(&url).list().await else {
        bail!("No tool listing from {}", url);
    };

    let width = tools.iter().map(|t| t.name.len()).max().unwrap_or(0);
    for tool in &tools {
        println!("  {:width$}  {}", tool.name, tool.description);
    }
    Ok(())
}

fn tool_server_url(url: Option<&str>) -> String {
    let default = || format!("http://{}:{}", server::DEFAULT_HOST, server::TOOLS_PORT);
    url.map(str::to_string).unwrap_or_else(default)
}
