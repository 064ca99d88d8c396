//! Tool listing and invocation

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};

use crate::error::AppError;
use crate::types::{ToolCallRequest, ToolCallResponse, ToolListResponse};
use crate::ToolState;

/// Build the tools router
pub fn router() -> Router<ToolState> {
    Router::new()
        .route("/tools", get(list_tools))
        .route("/call", post(call_tool))
}

async fn list_tools(State(state): State<ToolState>) -> Json<ToolListResponse> {
    Json(ToolListResponse {
        tools: state.registry.list().await,
    })
}

async fn call_tool(
    State(state): State<ToolState>,
    payload: Result<Json<ToolCallRequest>, JsonRejection>,
) -> Result<Json<ToolCallResponse>, AppError> {
    let Json(req) = payload?;
    let result = state.registry.call(&req.tool, req.params).await?;
    Ok(Json(ToolCallResponse { result }))
}
