//! Task manager
//!
//! Owns the task table for exactly one wrapped agent. `create_and_run_task`
//! drives a fresh task from `WORKING` to a terminal status and never fails for
//! its caller: agent errors, including panics, are recorded on the task.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::FutureExt;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{error, info, warn};

use super::payload::Payload;
use super::record::{Task, TaskMetadata, TaskStatus};
use super::request::SendTaskRequest;
use crate::agent::{Agent, AgentError};
use crate::constants::task::EXECUTION_LOG_LIMIT;

/// Coarse activity state of the wrapped agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    Idle,
    Processing,
    Completed,
    Error,
}

/// One finished execution
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionEntry {
    pub task_id: String,
    pub status: TaskStatus,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
}

/// Runtime information served by the endpoint's info route
#[derive(Debug, Clone, Serialize)]
pub struct AgentInfo {
    pub name: String,
    pub description: String,
    pub version: String,
    pub capabilities: Vec<String>,
    pub state: AgentState,
    pub created_at: DateTime<Utc>,
    pub last_activity: Option<DateTime<Utc>>,
    pub execution_count: usize,
    pub tasks_tracked: usize,
}

struct Activity {
    in_flight: usize,
    last_outcome: AgentState,
    created_at: DateTime<Utc>,
    last_activity: Option<DateTime<Utc>>,
    execution_count: usize,
    log: VecDeque<ExecutionEntry>,
}

impl Activity {
    fn state(&self) -> AgentState {
        if self.in_flight > 0 {
            AgentState::Processing
        } else {
            self.last_outcome
        }
    }
}

pub struct TaskManager {
    agent: Arc<dyn Agent>,
    tasks: DashMap<String, Task>,
    activity: Mutex<Activity>,
}

impl TaskManager {
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self {
            agent,
            tasks: DashMap::new(),
            activity: Mutex::new(Activity {
                in_flight: 0,
                last_outcome: AgentState::Idle,
                created_at: Utc::now(),
                last_activity: None,
                execution_count: 0,
                log: VecDeque::new(),
            }),
        }
    }

    pub fn agent(&self) -> &Arc<dyn Agent> {
        &self.agent
    }

    /// Create a task for `request`, run the agent, and return the finished task.
    pub async fn create_and_run_task(&self, request: SendTaskRequest) -> Task {
        let mut task = Task::new(request.message)
            .with_metadata(self.task_metadata());
        let task_id = task.id().to_string();
        self.tasks.insert(task_id.clone(), task.clone());

        info!(
            task_id = %task_id,
            agent = self.agent.name(),
            sender = request.metadata.as_ref().map(|m| m.sender.as_str()),
            "Task created"
        );

        let payload = task.messages()[0]
            .first_text()
            .map(Payload::from_text)
            .unwrap_or_else(|| Payload::RawText(String::new()));

        self.begin();
        let started = Instant::now();

        let outcome = AssertUnwindSafe(self.agent.execute(payload.into_request()))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(AgentError::Internal(panic_message(&*panic))));

        let transition = match outcome {
            Ok(result) => {
                info!(task_id = %task_id, agent = self.agent.name(), "Task completed");
                task.complete(result.to_string())
            }
            Err(err) => {
                warn!(
                    task_id = %task_id,
                    agent = self.agent.name(),
                    kind = %err.kind(),
                    "Task errored: {}",
                    err.detail()
                );
                task.fail(describe_failure(self.agent.name(), &err))
            }
        };
        if let Err(e) = transition {
            error!(task_id = %task_id, "Task state machine rejected outcome: {}", e);
        }

        self.record(&task, started.elapsed());
        self.tasks.insert(task_id, task.clone());
        task
    }

    /// Look up a task created by this manager.
    pub fn get_task(&self, task_id: &str) -> Option<Task> {
        self.tasks.get(task_id).map(|entry| entry.value().clone())
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Most recent executions, oldest first.
    pub fn recent_executions(&self) -> Vec<ExecutionEntry> {
        self.activity.lock().log.iter().cloned().collect()
    }

    pub fn info(&self) -> AgentInfo {
        let activity = self.activity.lock();
        AgentInfo {
            name: self.agent.name().to_string(),
            description: self.agent.description().to_string(),
            version: self.agent.version().to_string(),
            capabilities: self.agent.capabilities(),
            state: activity.state(),
            created_at: activity.created_at,
            last_activity: activity.last_activity,
            execution_count: activity.execution_count,
            tasks_tracked: self.tasks.len(),
        }
    }

    fn task_metadata(&self) -> TaskMetadata {
        TaskMetadata {
            agent_name: self.agent.name().to_string(),
            agent_version: self.agent.version().to_string(),
            capabilities: self.agent.capabilities(),
        }
    }

    fn begin(&self) {
        let mut activity = self.activity.lock();
        activity.in_flight += 1;
        activity.last_activity = Some(Utc::now());
    }

    fn record(&self, task: &Task, elapsed: Duration) {
        let mut activity = self.activity.lock();
        activity.in_flight = activity.in_flight.saturating_sub(1);
        activity.last_outcome = match task.status() {
            TaskStatus::Errored => AgentState::Error,
            _ => AgentState::Completed,
        };
        activity.last_activity = Some(Utc::now());
        activity.execution_count += 1;
        activity.log.push_back(ExecutionEntry {
            task_id: task.id().to_string(),
            status: task.status(),
            duration_ms: elapsed.as_millis() as u64,
            timestamp: Utc::now(),
        });
        while activity.log.len() > EXECUTION_LOG_LIMIT {
            activity.log.pop_front();
        }
    }
}

/// Text stored on an `ERRORED` task: `<kind> error in agent '<name>': <message>`.
fn describe_failure(agent: &str, err: &AgentError) -> String {
    format!(
        "{} error in agent '{}': {}",
        err.kind(),
        agent,
        err.detail()
    )
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("agent panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("agent panicked: {}", s)
    } else {
        "agent panicked".to_string()
    }
}

impl std::fmt::Debug for TaskManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskManager")
            .field("agent", &self.agent.name())
            .field("tasks", &self.tasks.len())
            .finish()
    }
}
