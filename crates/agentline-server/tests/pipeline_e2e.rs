//! End-to-end pipeline runs over real HTTP endpoints

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use agentline_core::agent::EchoAgent;
use agentline_core::card::AgentCard;
use agentline_core::config::AgentlineConfig;
use agentline_core::pipeline::PipelineReport;
use agentline_core::tools::builtin::EchoTool;
use agentline_core::tools::{ToolClient, ToolRegistry};
use agentline_core::{Agent, AgentClient, AgentError, OrchestratorAgent, TaskSender, TaskStatus};
use agentline_server::{build_agent_router, build_tool_router, serve, AgentState};

/// Echo stage that counts its calls and can be slowed down
struct CountingAgent {
    inner: EchoAgent,
    calls: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

impl CountingAgent {
    fn new(name: &str) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let agent = Self {
            inner: EchoAgent::new(name),
            calls: calls.clone(),
            delay: None,
        };
        (agent, calls)
    }

    fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl Agent for CountingAgent {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    async fn execute(&self, payload: Value) -> Result<Value, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.execute(payload).await
    }
}

/// Serve `agent` on an ephemeral port and return its base URL.
async fn spawn_agent(agent: Arc<dyn Agent>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/", listener.local_addr().unwrap());
    let card = AgentCard::for_agent(agent.as_ref(), url.clone());
    let app = build_agent_router(AgentState::new(agent, card), &["*".to_string()]);
    tokio::spawn(async move {
        let _ = serve(listener, app).await;
    });
    url
}

struct Deployment {
    orchestrator_url: String,
    calls: Vec<Arc<AtomicUsize>>,
}

/// Serve the default four-stage pipeline, slowing down the stage named `slow`.
async fn deploy(mut config: AgentlineConfig, slow: Option<(&str, Duration)>) -> Deployment {
    let mut calls = Vec::new();
    for stage in config.stages.iter_mut() {
        let (mut agent, counter) = CountingAgent::new(&stage.name);
        if let Some((name, delay)) = slow {
            if name == stage.name {
                agent = agent.slow(delay);
            }
        }
        stage.url = spawn_agent(Arc::new(agent)).await;
        calls.push(counter);
    }

    let orchestrator = Arc::new(OrchestratorAgent::from_config(&config));
    let orchestrator_url = spawn_agent(orchestrator).await;
    Deployment {
        orchestrator_url,
        calls,
    }
}

fn report_of(task: &agentline_core::Task) -> PipelineReport {
    serde_json::from_str(task.result_text().unwrap()).unwrap()
}

#[tokio::test]
async fn test_full_pipeline_over_http() {
    let deployment = deploy(AgentlineConfig::default(), None).await;

    let task = AgentClient::new(&deployment.orchestrator_url)
        .send_task(&json!({"query": "renewable energy adoption"}))
        .await
        .expect("orchestrator reachable");

    assert_eq!(task.status(), TaskStatus::Completed);
    let report = report_of(&task);
    assert!(report.workflow_completed);
    assert_eq!(report.query, "renewable energy adoption");
    assert_eq!(
        report.completed_stage_names(),
        vec![
            "data_gathering",
            "quantitative_analysis",
            "qualitative_analysis",
            "report_generation"
        ]
    );

    // Later stages receive earlier results under their configured keys
    let final_report = report.final_report.unwrap();
    assert_eq!(final_report["agent"], "report_generation");
    assert_eq!(
        final_report["received"]["data_analysis"]["agent"],
        "data_gathering"
    );
    assert_eq!(
        final_report["received"]["quantitative_analysis"]["agent"],
        "quantitative_analysis"
    );

    for counter in &deployment.calls {
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}

#[tokio::test]
async fn test_plain_string_query_is_accepted() {
    let deployment = deploy(AgentlineConfig::default(), None).await;

    let task = AgentClient::new(&deployment.orchestrator_url)
        .send_task(&json!("wind power"))
        .await
        .unwrap();

    let report = report_of(&task);
    assert!(report.workflow_completed);
    assert_eq!(report.query, "wind power");
}

#[tokio::test]
async fn test_stage_timeout_aborts_pipeline() {
    let mut config = AgentlineConfig::default();
    config.client.stage_timeout_secs = 1;
    config.client.stage_attempts = 1;

    let deployment = deploy(
        config,
        Some(("quantitative_analysis", Duration::from_secs(3))),
    )
    .await;

    let task = AgentClient::new(&deployment.orchestrator_url)
        .send_task(&json!({"query": "q"}))
        .await
        .unwrap();

    // The outer task completes; the pipeline failure is carried in the report
    assert_eq!(task.status(), TaskStatus::Completed);
    let report = report_of(&task);
    assert!(!report.workflow_completed);
    assert_eq!(report.completed_stage_names(), vec!["data_gathering"]);

    let failure = report.failure.unwrap();
    assert_eq!(failure.stage, "quantitative_analysis");
    assert_eq!(failure.step, 2);
    assert!(report.final_report.is_none());

    assert_eq!(deployment.calls[0].load(Ordering::SeqCst), 1);
    assert_eq!(deployment.calls[1].load(Ordering::SeqCst), 1);
    assert_eq!(deployment.calls[2].load(Ordering::SeqCst), 0);
    assert_eq!(deployment.calls[3].load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unreachable_endpoint_yields_no_result() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/", listener.local_addr().unwrap());
    drop(listener);

    let result = AgentClient::new(&url)
        .with_timeout(Duration::from_secs(2))
        .send_task(&json!({"query": "q"}))
        .await;
    assert!(result.is_none());
    assert!(AgentClient::new(&url).fetch_card().await.is_none());
}

#[tokio::test]
async fn test_card_fetch_over_http() {
    let agent = Arc::new(EchoAgent::new("data_gathering"));
    let url = spawn_agent(agent).await;
    let card = AgentClient::new(&url).fetch_card().await.unwrap();

    assert_eq!(card.name, "data_gathering");
    assert_eq!(card.url, url);
}

#[tokio::test]
async fn test_tool_client_over_http() {
    let registry = Arc::new(ToolRegistry::new());
    registry.register(Arc::new(EchoTool)).await;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let app = build_tool_router(registry, &[]);
    tokio::spawn(async move {
        let _ = serve(listener, app).await;
    });

    let tools = ToolClient::new(&url);
    let listed = tools.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "echo");

    let result = tools.call("echo", json!({"text": "hi"})).await;
    assert_eq!(result, Some(json!({"text": "hi"})));
    assert!(tools.call("nonexistent_tool", json!({})).await.is_none());
}
