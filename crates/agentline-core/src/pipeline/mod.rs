//! Sequential agent pipeline
//!
//! The orchestrating agent runs an ordered list of stages. Each stage sends a
//! request built from the query and earlier results to one downstream agent.
//! The first stage that yields no result or a non-`COMPLETED` task aborts the
//! run; the abort is reported as data, never raised.

mod orchestrator;
mod report;
mod stage;

pub use orchestrator::{normalize_query, OrchestratorAgent};
pub use report::{
    parse_stage_output, ParseFailure, PipelineReport, StageFailure, StageResult, StepRecord,
    StepStatus, WorkflowMetadata,
};
pub use stage::{RequestBuilder, Stage, StageOutputs};
