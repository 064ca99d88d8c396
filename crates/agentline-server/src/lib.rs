//! Agentline Server
//!
//! Exposes one task manager per endpoint over HTTP, together with its
//! discovery card and runtime info. Tool registries are served by a separate
//! router. This is a library crate; the binary lives in `agentline-cli`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use agentline_core::card::AgentCard;
use agentline_core::config::ServerSettings;
use agentline_core::tools::ToolRegistry;
use agentline_core::{Agent, TaskManager};

pub mod error;
pub mod routes;
pub mod types;

use types::HealthResponse;

/// Configuration for starting a server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS. `"*"` allows any origin.
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_settings(settings: &ServerSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            allowed_origins: settings.allowed_origins.clone(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Base URL this server is reachable at
    pub fn public_url(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_settings(&ServerSettings::default())
    }
}

/// Shared state of an agent endpoint.
#[derive(Clone)]
pub struct AgentState {
    pub task_manager: Arc<TaskManager>,
    pub card: Arc<AgentCard>,
}

impl AgentState {
    pub fn new(agent: Arc<dyn Agent>, card: AgentCard) -> Self {
        Self {
            task_manager: Arc::new(TaskManager::new(agent)),
            card: Arc::new(card),
        }
    }
}

/// Shared state of a tool server.
#[derive(Clone)]
pub struct ToolState {
    pub registry: Arc<ToolRegistry>,
}

/// Router for an agent endpoint.
pub fn build_agent_router(state: AgentState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes::agent_router())
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router for a tool server.
pub fn build_tool_router(registry: Arc<ToolRegistry>, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes::tool_router())
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(ToolState { registry })
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origin = if allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", o);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Serve an agent endpoint and block until shutdown.
pub async fn start_agent_server(config: ServerConfig, agent: Arc<dyn Agent>) -> anyhow::Result<()> {
    let card = AgentCard::for_agent(agent.as_ref(), config.public_url());
    let name = agent.name().to_string();
    let app = build_agent_router(AgentState::new(agent, card), &config.allowed_origins);
    let listener = bind(&config).await?;

    tracing::info!(
        "Agent '{}' listening on http://{}",
        name,
        listener.local_addr()?
    );
    serve(listener, app).await
}

/// Serve a tool registry and block until shutdown.
pub async fn start_tool_server(
    config: ServerConfig,
    registry: Arc<ToolRegistry>,
) -> anyhow::Result<()> {
    let app = build_tool_router(registry, &config.allowed_origins);
    let listener = bind(&config).await?;

    tracing::info!("Tool server listening on http://{}", listener.local_addr()?);
    serve(listener, app).await
}

/// Run `app` on an already bound listener.
pub async fn serve(listener: TcpListener, app: Router) -> anyhow::Result<()> {
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

async fn bind(config: &ServerConfig) -> anyhow::Result<TcpListener> {
    let addr = format!("{}:{}", config.host, config.port);
    Ok(TcpListener::bind(addr).await?)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
