//! Discovery card and runtime info

use axum::{extract::State, routing::get, Json, Router};

use agentline_core::card::AgentCard;
use agentline_core::constants::server::CARD_PATH;
use agentline_core::task::AgentInfo;

use crate::types::CapabilitiesResponse;
use crate::AgentState;

/// Build the discovery router
pub fn router() -> Router<AgentState> {
    Router::new()
        .route(CARD_PATH, get(card))
        .route("/agent/info", get(info))
        .route("/agent/capabilities", get(capabilities))
}

async fn card(State(state): State<AgentState>) -> Json<AgentCard> {
    Json(state.card.as_ref().clone())
}

async fn info(State(state): State<AgentState>) -> Json<AgentInfo> {
    Json(state.task_manager.info())
}

async fn capabilities(State(state): State<AgentState>) -> Json<CapabilitiesResponse> {
    Json(CapabilitiesResponse {
        capabilities: state.task_manager.agent().capabilities(),
    })
}
