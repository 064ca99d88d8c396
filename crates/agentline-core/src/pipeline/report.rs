//! Pipeline reports
//!
//! The orchestrator's result is always a [`PipelineReport`]. A completed run
//! lists every stage with its parsed result; an aborted run names the failing
//! stage and lists only the stages that completed before it.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::stage::StageOutputs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    /// 1-based position in the pipeline
    pub step: usize,
    pub agent: String,
    pub status: StepStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    pub name: String,
    pub result: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFailure {
    pub step: usize,
    pub stage: String,
    pub status: StepStatus,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowMetadata {
    pub total_steps: usize,
    pub completed_steps: usize,
    pub failed_steps: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub orchestrator: String,
    pub workflow_completed: bool,
    pub query: String,
    /// Completed steps, in run order
    pub workflow_steps: Vec<StepRecord>,
    /// Parsed result of each completed stage, in run order
    pub stages: Vec<StageResult>,
    /// Result of the last stage, present only when every stage completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_report: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<StageFailure>,
    pub workflow_metadata: WorkflowMetadata,
}

impl PipelineReport {
    pub fn completed(orchestrator: &str, query: &str, outputs: &StageOutputs) -> Self {
        let total = outputs.len();
        Self {
            orchestrator: orchestrator.to_string(),
            workflow_completed: true,
            query: query.to_string(),
            workflow_steps: completed_steps(outputs),
            stages: stage_results(outputs),
            final_report: outputs.last().cloned(),
            failure: None,
            workflow_metadata: WorkflowMetadata {
                total_steps: total,
                completed_steps: total,
                failed_steps: 0,
            },
        }
    }

    pub fn failed(
        orchestrator: &str,
        query: &str,
        total_steps: usize,
        outputs: &StageOutputs,
        failing_stage: &str,
        error: String,
    ) -> Self {
        Self {
            orchestrator: orchestrator.to_string(),
            workflow_completed: false,
            query: query.to_string(),
            workflow_steps: completed_steps(outputs),
            stages: stage_results(outputs),
            final_report: None,
            failure: Some(StageFailure {
                step: outputs.len() + 1,
                stage: failing_stage.to_string(),
                status: StepStatus::Failed,
                error,
            }),
            workflow_metadata: WorkflowMetadata {
                total_steps,
                completed_steps: outputs.len(),
                failed_steps: 1,
            },
        }
    }

    /// Names of the completed stages, in run order
    pub fn completed_stage_names(&self) -> Vec<&str> {
        self.workflow_steps
            .iter()
            .map(|s| s.agent.as_str())
            .collect()
    }
}

fn completed_steps(outputs: &StageOutputs) -> Vec<StepRecord> {
    outputs
        .iter()
        .enumerate()
        .map(|(i, (name, _))| StepRecord {
            step: i + 1,
            agent: name.to_string(),
            status: StepStatus::Completed,
        })
        .collect()
}

fn stage_results(outputs: &StageOutputs) -> Vec<StageResult> {
    outputs
        .iter()
        .map(|(name, value)| StageResult {
            name: name.to_string(),
            result: value.clone(),
        })
        .collect()
}

/// Marker kept in place of a stage result whose text was not valid JSON
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub raw: String,
}

impl ParseFailure {
    pub fn into_value(self) -> Value {
        json!({
            "error": "failed to parse result",
            "parse_failure": true,
            "raw": self.raw,
        })
    }

    /// Whether `value` is a parse-failure marker
    pub fn is_marker(value: &Value) -> bool {
        value.get("parse_failure").and_then(Value::as_bool) == Some(true)
    }
}

/// Parse a stage's result text, falling back to a [`ParseFailure`] marker.
pub fn parse_stage_output(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| {
        ParseFailure {
            raw: text.to_string(),
        }
        .into_value()
    })
}
