//! Orchestrating agent
//!
//! An [`Agent`] whose execution runs the configured stages strictly in order.
//! Its own task completes with the pipeline report even when a stage failed:
//! inner failure is data (`workflow_completed: false`), outer completion is
//! the transport-level outcome.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use super::report::{parse_stage_output, PipelineReport};
use super::stage::{Stage, StageOutputs};
use crate::agent::{Agent, AgentError};
use crate::client::AgentClient;
use crate::config::AgentlineConfig;
use crate::task::{RequestMetadata, Task, TaskStatus};

const ORCHESTRATOR_NAME: &str = "orchestrator_agent";
const WORKFLOW_NAME: &str = "agent_pipeline";
const NO_RESULT: &str = "no result from agent (unreachable, timed out, or rejected)";

pub struct OrchestratorAgent {
    name: String,
    description: String,
    stages: Vec<Stage>,
}

impl OrchestratorAgent {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self {
            name: ORCHESTRATOR_NAME.to_string(),
            description: "Coordinates the pipeline's downstream agents".to_string(),
            stages,
        }
    }

    /// Pipeline of HTTP stages as declared in `config`.
    pub fn from_config(config: &AgentlineConfig) -> Self {
        let metadata = RequestMetadata {
            sender: ORCHESTRATOR_NAME.to_string(),
            workflow: Some(WORKFLOW_NAME.to_string()),
        };

        let stages = config
            .stages
            .iter()
            .map(|stage| {
                let client = AgentClient::for_stage(&stage.url, &config.client)
                    .with_metadata(metadata.clone());
                Stage::with_inputs(stage.name.clone(), Arc::new(client), stage.inputs.clone())
            })
            .collect();

        Self::new(stages)
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run every stage in order, stopping at the first failure.
    pub async fn run_pipeline(&self, query: &str) -> PipelineReport {
        let mut outputs = StageOutputs::default();
        let total = self.stages.len();

        for (index, stage) in self.stages.iter().enumerate() {
            let step = index + 1;
            info!(stage = stage.name(), step, total, "Running pipeline stage");

            let request = stage.build_request(query, &outputs);
            let task = stage.sender().send_task(&request).await;

            match completed_text(task.as_ref()) {
                Ok(text) => {
                    outputs.push(stage.name(), parse_stage_output(text));
                }
                Err(error) => {
                    warn!(stage = stage.name(), step, "Pipeline aborted: {}", error);
                    return PipelineReport::failed(
                        &self.name,
                        query,
                        total,
                        &outputs,
                        stage.name(),
                        error,
                    );
                }
            }
        }

        info!(stages = total, "Pipeline completed");
        PipelineReport::completed(&self.name, query, &outputs)
    }
}

/// Result text of a completed task, or why the stage counts as failed.
fn completed_text(task: Option<&Task>) -> Result<&str, String> {
    let Some(task) = task else {
        return Err(NO_RESULT.to_string());
    };

    match task.status() {
        TaskStatus::Completed => Ok(task.result_text().unwrap_or_default()),
        TaskStatus::Errored => Err(format!(
            "task {} errored: {}",
            task.id(),
            task.last_text().unwrap_or("no details")
        )),
        TaskStatus::Working => Err(format!("task {} returned unfinished", task.id())),
    }
}

/// Canonical query: a bare string, or the `query` / `message` field of an object.
/// Anything else is used in its serialized form.
pub fn normalize_query(payload: &Value) -> String {
    if let Some(query) = payload.as_str() {
        return query.to_string();
    }

    ["query", "message"]
        .iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| payload.to_string())
}

#[async_trait]
impl Agent for OrchestratorAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn version(&self) -> &str {
        "2.0.0"
    }

    fn capabilities(&self) -> Vec<String> {
        vec![
            "multi_agent_coordination".to_string(),
            "sequential_workflow".to_string(),
            "result_aggregation".to_string(),
        ]
    }

    fn skills(&self) -> Vec<(String, String)> {
        let name = "multi_agent_research".to_string();
        let description =
            "Runs a query through every pipeline stage in order and aggregates the results.";
        vec![(name, description.to_string())]
    }

    async fn execute(&self, payload: Value) -> Result<Value, AgentError> {
        let query = normalize_query(&payload);
        let report = self.run_pipeline(&query).await;
        serde_json::to_value(report)
            .map_err(|e| AgentError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::AgentCard;
    use crate::client::TaskSender;
    use crate::pipeline::{ParseFailure, StepStatus};
    use crate::task::{Message, SendTaskRequest, TaskManager};
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Behavior {
        Complete(String),
        Error(String),
        Unreachable,
    }

    /// In-process sender with a call counter
    struct FakeSender {
        target: String,
        behavior: Behavior,
        calls: AtomicUsize,
        last_request: parking_lot::Mutex<Option<Value>>,
    }

    impl FakeSender {
        fn new(name: &str, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                target: format!("http://{}/", name),
                behavior,
                calls: AtomicUsize::new(0),
                last_request: parking_lot::Mutex::new(None),
            })
        }

        fn ok(name: &str) -> Arc<Self> {
            Self::new(name, Behavior::Complete(json!({"from": name}).to_string()))
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TaskSender for FakeSender {
        fn target(&self) -> &str {
            &self.target
        }

        async fn send_task(&self, payload: &Value) -> Option<Task> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock() = Some(payload.clone());
            let mut task = Task::new(Message::user(payload.to_string()));
            match &self.behavior {
                Behavior::Complete(text) => task.complete(text.clone()).ok()?,
                Behavior::Error(text) => task.fail(text.clone()).ok()?,
                Behavior::Unreachable => return None,
            }
            Some(task)
        }
    }

    fn research_stages(senders: &[Arc<FakeSender>; 4]) -> Vec<Stage> {
        let names = [
            "data_gathering",
            "quantitative_analysis",
            "qualitative_analysis",
            "report_generation",
        ];
        names
            .iter()
            .zip(senders.iter())
            .enumerate()
            .map(|(i, (name, sender))| {
                let inputs = if i == 0 {
                    BTreeMap::new()
                } else {
                    BTreeMap::from([("data".to_string(), "data_gathering".to_string())])
                };
                Stage::with_inputs(*name, sender.clone() as Arc<dyn TaskSender>, inputs)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_all_stages_complete() {
        let senders = [
            FakeSender::ok("data"),
            FakeSender::ok("quant"),
            FakeSender::ok("qual"),
            FakeSender::ok("report"),
        ];
        let orchestrator = OrchestratorAgent::new(research_stages(&senders));

        let report = orchestrator.run_pipeline("Analyze AAPL").await;

        assert!(report.workflow_completed);
        assert_eq!(report.workflow_steps.len(), 4);
        assert!(report
            .workflow_steps
            .iter()
            .all(|s| s.status == StepStatus::Completed));
        assert_eq!(report.final_report, Some(json!({"from": "report"})));
        for sender in &senders {
            assert_eq!(sender.calls(), 1);
        }

        // Stage 2 received stage 1's parsed result
        let request = senders[1].last_request.lock().clone().unwrap();
        assert_eq!(request["query"], "Analyze AAPL");
        assert_eq!(request["data"], json!({"from": "data"}));
    }

    #[tokio::test]
    async fn test_unreachable_stage_aborts_pipeline() {
        let senders = [
            FakeSender::ok("data"),
            FakeSender::new("quant", Behavior::Unreachable),
            FakeSender::ok("qual"),
            FakeSender::ok("report"),
        ];
        let orchestrator = OrchestratorAgent::new(research_stages(&senders));

        let report = orchestrator.run_pipeline("Analyze AAPL").await;

        assert!(!report.workflow_completed);
        assert_eq!(report.completed_stage_names(), vec!["data_gathering"]);
        let failure = report.failure.unwrap();
        assert_eq!(failure.stage, "quantitative_analysis");
        assert_eq!(failure.step, 2);
        assert_eq!(senders[2].calls(), 0);
        assert_eq!(senders[3].calls(), 0);
    }

    #[tokio::test]
    async fn test_errored_stage_aborts_pipeline() {
        let senders = [
            FakeSender::ok("data"),
            FakeSender::ok("quant"),
            FakeSender::new("qual", Behavior::Error("model offline".to_string())),
            FakeSender::ok("report"),
        ];
        let orchestrator = OrchestratorAgent::new(research_stages(&senders));

        let report = orchestrator.run_pipeline("Analyze AAPL").await;

        assert!(!report.workflow_completed);
        assert_eq!(
            report.completed_stage_names(),
            vec!["data_gathering", "quantitative_analysis"]
        );
        let failure = report.failure.unwrap();
        assert_eq!(failure.stage, "qualitative_analysis");
        assert!(failure.error.contains("model offline"));
        assert_eq!(senders[3].calls(), 0);
    }

    #[tokio::test]
    async fn test_unparseable_stage_result_is_marked() {
        let senders = [
            FakeSender::new("data", Behavior::Complete("plain text result".to_string())),
            FakeSender::ok("quant"),
            FakeSender::ok("qual"),
            FakeSender::ok("report"),
        ];
        let orchestrator = OrchestratorAgent::new(research_stages(&senders));

        let report = orchestrator.run_pipeline("Analyze AAPL").await;

        assert!(report.workflow_completed);
        assert!(ParseFailure::is_marker(&report.stages[0].result));
        let request = senders[1].last_request.lock().clone().unwrap();
        assert!(ParseFailure::is_marker(&request["data"]));
    }

    #[tokio::test]
    async fn test_outer_task_completes_when_pipeline_fails() {
        let senders = [
            FakeSender::new("data", Behavior::Unreachable),
            FakeSender::ok("quant"),
            FakeSender::ok("qual"),
            FakeSender::ok("report"),
        ];
        let orchestrator = OrchestratorAgent::new(research_stages(&senders));
        let manager = TaskManager::new(Arc::new(orchestrator));

        let request = SendTaskRequest::from_payload(&json!({"query": "Analyze AAPL"}));
        let task = manager.create_and_run_task(request).await;

        assert_eq!(task.status(), TaskStatus::Completed);
        let report: PipelineReport = serde_json::from_str(task.result_text().unwrap()).unwrap();
        assert!(!report.workflow_completed);
        assert!(report.workflow_steps.is_empty());
        assert_eq!(report.failure.unwrap().stage, "data_gathering");
    }

    #[test]
    fn test_normalize_query() {
        let cases = [
            (json!("Analyze AAPL"), "Analyze AAPL"),
            (json!({"query": "Analyze AAPL"}), "Analyze AAPL"),
            (json!({"message": "Analyze MSFT"}), "Analyze MSFT"),
            (json!({"query": "a", "message": "b"}), "a"),
            (json!({"symbol": "AAPL"}), r#"{"symbol":"AAPL"}"#),
        ];
        for (payload, expected) in cases {
            assert_eq!(normalize_query(&payload), expected);
        }
    }

    #[test]
    fn test_from_config_builds_declared_stages() {
        let config = AgentlineConfig::default();
        let orchestrator = OrchestratorAgent::from_config(&config);

        let names: Vec<&str> = orchestrator.stages().iter().map(Stage::name).collect();
        assert_eq!(
            names,
            vec![
                "data_gathering",
                "quantitative_analysis",
                "qualitative_analysis",
                "report_generation"
            ]
        );
        assert_eq!(orchestrator.stages()[0].target(), "http://localhost:9001/");
    }

    #[test]
    fn test_card_advertises_pipeline_skill() {
        let orchestrator = OrchestratorAgent::from_config(&AgentlineConfig::default());
        let card = AgentCard::for_agent(&orchestrator, "http://localhost:9000/");

        assert_eq!(card.version, "2.0.0");
        assert_eq!(card.skills.len(), 1);
        assert_eq!(card.skills[0].name, "multi_agent_research");
    }
}
