//! agentline - run and drive a pipeline of task-executing agents
//!
//! - `agentline serve orchestrator` runs the orchestrating agent
//! - `agentline serve stage --name <stage>` runs a stand-in stage agent
//! - `agentline serve tools` runs the built-in tool server
//! - `agentline send <query>` submits a query to the orchestrator
//! - `agentline call <tool>` invokes a tool, `agentline call --list` lists them
//! - `agentline status` checks every configured endpoint

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use agentline_core::config::AgentlineConfig;

mod call;
mod send;
mod serve;
mod status;

#[derive(Parser)]
#[command(name = "agentline")]
#[command(about = "Run and drive a pipeline of agents", long_about = None)]
struct Cli {
    /// Config file (default: ~/.agentline/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve an agent endpoint or tool server
    Serve {
        #[command(subcommand)]
        target: ServeTarget,
    },

    /// Send a query to the orchestrator and print the pipeline report
    Send {
        query: String,
        /// Orchestrator URL (default: configured server address)
        #[arg(long)]
        url: Option<String>,
    },

    /// Call a tool on a tool server, or list its tools
    Call {
        #[arg(required_unless_present = "list")]
        tool: Option<String>,
        /// List the server's tools instead of calling one
        #[arg(long, conflicts_with = "tool")]
        list: bool,
        /// Tool parameters as JSON
        #[arg(long, default_value = "{}")]
        params: String,
        /// Tool server URL
        #[arg(long)]
        url: Option<String>,
    },

    /// Check that the orchestrator and every stage respond
    Status,
}

#[derive(Subcommand)]
pub(crate) enum ServeTarget {
    /// The orchestrating agent over the configured pipeline
    Orchestrator {
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// A stand-in agent for one configured stage
    Stage {
        #[arg(short, long)]
        name: String,
        /// Defaults to the port in the stage's configured URL
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// The built-in tool server
    Tools {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok()))
        .with_writer(std::io::stderr)
        .init();

    let config = AgentlineConfig::load(cli.config.as_deref())
        .context("Failed to load config")?;

    match cli.command {
        Commands::Serve { target } => serve::run(&config, target).await,
        Commands::Send { query, url } => send::run(&config, &query, url.as_deref()).await,
        Commands::Call {
            tool,
            list,
            params,
            url,
        } => match tool {
            Some(tool) if !list => call::run(&tool, &params, url.as_deref()).await,
            _ => call::list(url.as_deref()).await,
        },
        Commands::Status => status::run(&config).await,
    }
}

/// `RUST_LOG` directives when set and valid, otherwise INFO.
fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
