//! `agentline serve` - run an endpoint until ctrl-c

use std::sync::Arc;

use anyhow::{anyhow, Result};

use agentline_core::agent::EchoAgent;
use agentline_core::config::AgentlineConfig;
use agentline_core::constants::server;
use agentline_core::tools::builtin::{EchoTool, StageDirectoryTool};
use agentline_core::tools::ToolRegistry;
use agentline_core::{Agent, OrchestratorAgent};
use agentline_server::ServerConfig;

use crate::ServeTarget;

/// Run the serve command.
pub async fn run(config: &AgentlineConfig, target: ServeTarget) -> Result<()> {
    let base = ServerConfig::from_settings(&config.server);

    let server = match target {
        ServeTarget::Orchestrator { port } => {
            let server_config = base.with_port(port.unwrap_or(config.server.port));
            let orchestrator = OrchestratorAgent::from_config(config);
            for stage in orchestrator.stages() {
                tracing::info!(stage = stage.name(), url = stage.target(), "Pipeline stage");
            }
            let agent: Arc<dyn Agent> = Arc::new(orchestrator);
            tokio::spawn(agentline_server::start_agent_server(server_config, agent))
        }
        ServeTarget::Stage { name, port } => {
            let stage = config
                .stage(&name)
                .ok_or_else(|| anyhow!("No stage named '{}' in config", name))?;
            let port = port
                .or_else(|| stage.port())
                .ok_or_else(|| anyhow!("No port for stage '{}'; pass --port", name))?;
            let server_config = base.with_port(port);
            let agent: Arc<dyn Agent> = Arc::new(EchoAgent::new(name));
            tokio::spawn(agentline_server::start_agent_server(server_config, agent))
        }
        ServeTarget::Tools { port } => {
            let registry = Arc::new(ToolRegistry::new());
            registry.register(Arc::new(EchoTool)).await;
            registry
                .register(Arc::new(StageDirectoryTool::new(config.stages.clone())))
                .await;
            let server_config = base.with_port(port.unwrap_or(server::TOOLS_PORT));
            tokio::spawn(agentline_server::start_tool_server(server_config, registry))
        }
    };

    tokio::select! {
        result = server => {
            result??;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
        }
    }

    Ok(())
}
