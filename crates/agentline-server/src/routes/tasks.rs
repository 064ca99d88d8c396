//! Task submission endpoint

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};

use agentline_core::task::{SendTaskRequest, Task};

use crate::error::AppError;
use crate::AgentState;

/// Build the tasks router
pub fn router() -> Router<AgentState> {
    Router::new()
        .route("/", post(send_task))
        .route("/tasks/:id", get(get_task))
}

/// Run a task to completion and return its record
async fn send_task(
    State(state): State<AgentState>,
    payload: Result<Json<SendTaskRequest>, JsonRejection>,
) -> Result<Json<Task>, AppError> {
    let Json(request) = payload?;
    request.validate()?;

    let task = state.task_manager.create_and_run_task(request).await;
    Ok(Json(task))
}

async fn get_task(
    State(state): State<AgentState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, AppError> {
    state
        .task_manager
        .get_task(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Task '{}' not found", id)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::Value;

    use crate::routes::test_support::{call, echo_state, get, post_json, task_request};

    /// Parsed result text of the agent's reply message
    fn result_of(task: &Value) -> Value {
        let text = task["messages"][1]["parts"][0]["text"].as_str().unwrap();
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn test_send_task_returns_completed_record() {
        let state = echo_state();
        let (status, body) = call(&state, task_request(r#"{"query":"solar"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "COMPLETED");
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);
        assert_eq!(body["messages"][1]["role"], "agent");
        assert_eq!(result_of(&body)["received"]["query"], "solar");
        assert_eq!(state.task_manager.task_count(), 1);
    }

    #[tokio::test]
    async fn test_plain_text_is_coerced_to_query() {
        let (status, body) = call(&echo_state(), task_request("just some words")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "COMPLETED");
        assert_eq!(result_of(&body)["received"]["query"], "just some words");
    }

    #[tokio::test]
    async fn test_agent_failure_is_errored_not_http_error() {
        let request = task_request(r#"{"topic":"no query here"}"#);
        let (status, body) = call(&echo_state(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ERRORED");
        assert_eq!(body["messages"][1]["role"], "agent");
        assert_eq!(
            body["messages"][1]["parts"][0]["text"],
            "invalid_input error in agent 'data_gathering': request has no 'query' field"
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected_without_task() {
        let state = echo_state();

        let (status, body) = call(&state, post_json("/", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");

        let no_parts = post_json("/", r#"{"message": {"role": "user"}}"#);
        let (status, _) = call(&state, no_parts).await;
        assert!(status.is_client_error());

        let empty_parts = post_json("/", r#"{"message": {"role": "user", "parts": []}}"#);
        let (status, _) = call(&state, empty_parts).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(state.task_manager.task_count(), 0);
    }

    #[tokio::test]
    async fn test_get_task_by_id() {
        let state = echo_state();
        let (_, created) = call(&state, task_request(r#"{"query":"q"}"#)).await;
        let id = created["id"].as_str().unwrap();

        let (status, body) = call(&state, get(&format!("/tasks/{}", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, created);

        let (status, body) = call(&state, get("/tasks/missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }
}
