//! Request and response types for the API

use serde::{Deserialize, Serialize};
use serde_json::Value;

use agentline_core::tools::ToolInfo;

// ============================================================================
// Agent Types
// ============================================================================

#[derive(Serialize, Deserialize)]
pub struct CapabilitiesResponse {
    pub capabilities: Vec<String>,
}

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// ============================================================================
// Tool Types
// ============================================================================

#[derive(Deserialize)]
pub struct ToolCallRequest {
    pub tool: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Serialize)]
pub struct ToolCallResponse {
    pub result: Value,
}

#[derive(Serialize)]
pub struct ToolListResponse {
    pub tools: Vec<ToolInfo>,
}
