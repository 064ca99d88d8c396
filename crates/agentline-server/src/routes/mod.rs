//! API routes

use axum::Router;

use crate::{AgentState, ToolState};

mod discovery;
mod tasks;
mod tools;

/// Routes of an agent endpoint
pub fn agent_router() -> Router<AgentState> {
    Router::new()
        .merge(tasks::router())
        .merge(discovery::router())
}

/// Routes of a tool server
pub fn tool_router() -> Router<ToolState> {
    tools::router()
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use agentline_core::agent::EchoAgent;
    use agentline_core::card::AgentCard;

    use crate::{build_agent_router, AgentState};

    pub fn echo_state() -> AgentState {
        let agent = Arc::new(EchoAgent::new("data_gathering"));
        let card = AgentCard::for_agent(agent.as_ref(), "http://127.0.0.1:9001/");
        AgentState::new(agent, card)
    }

    pub fn echo_app(state: AgentState) -> Router {
        build_agent_router(state, &["*".to_string()])
    }

    /// Send `request` to a fresh echo router over `state`
    pub async fn call(state: &AgentState, request: Request<Body>) -> (StatusCode, Value) {
        send(echo_app(state.clone()), request).await
    }

    pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    /// `POST /` body carrying `text` as the single message part
    pub fn task_request(text: &str) -> Request<Body> {
        let body = json!({"message": {"role": "user", "parts": [{"text": text}]}});
        post_json("/", &body.to_string())
    }
}
