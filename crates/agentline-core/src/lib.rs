//! Agentline Core
//!
//! Task execution protocol and orchestration core for a pipeline of HTTP agents:
//! task records and the task manager state machine, the agent contract, the
//! agent client, the orchestrating pipeline agent, and tool registries.

pub mod agent;
pub mod card;
pub mod client;
pub mod config;
pub mod constants;
pub mod paths;
pub mod pipeline;
pub mod retry;
pub mod task;
pub mod tools;

pub use agent::{Agent, AgentError, AgentErrorKind};
pub use card::AgentCard;
pub use client::{AgentClient, TaskSender};
pub use config::AgentlineConfig;
pub use pipeline::{OrchestratorAgent, PipelineReport, Stage};
pub use task::{Message, Role, SendTaskRequest, Task, TaskManager, TaskStatus};
