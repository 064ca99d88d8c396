//! Task protocol
//!
//! A task is one invocation of one agent. It starts `WORKING` holding the
//! request message and ends `COMPLETED` or `ERRORED` with exactly one appended
//! agent message carrying the result or the failure description.

mod manager;
mod message;
mod payload;
mod record;
mod request;

pub use manager::{AgentInfo, AgentState, ExecutionEntry, TaskManager};
pub use message::{Message, Part, Role};
pub use payload::Payload;
pub use record::{Task, TaskMetadata, TaskStatus, TransitionError};
pub use request::{RequestError, RequestMetadata, SendTaskRequest};
