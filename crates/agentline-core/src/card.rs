//! Agent discovery card
//!
//! Served read-only at `/.well-known/agent.json`. Built once at startup and
//! never touched by task execution.

use serde::{Deserialize, Serialize};

use crate::agent::Agent;

/// Protocol-level capabilities of an endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardCapabilities {
    pub can_stream: bool,
    pub can_push_notifications: bool,
    pub can_state_transition_history: bool,
}

impl Default for CardCapabilities {
    fn default() -> Self {
        Self {
            can_stream: false,
            can_push_notifications: false,
            can_state_transition_history: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    pub name: String,
    pub description: String,
    pub url: String,
    pub version: String,
    pub default_input_modes: Vec<String>,
    pub default_output_modes: Vec<String>,
    pub capabilities: CardCapabilities,
    /// Capability tags of the wrapped agent
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

impl AgentCard {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            url: url.into(),
            version: "1.0.0".to_string(),
            default_input_modes: vec!["application/json".to_string()],
            default_output_modes: vec!["application/json".to_string()],
            capabilities: CardCapabilities::default(),
            tags: Vec::new(),
            skills: Vec::new(),
        }
    }

    /// Card describing `agent` at `url`
    pub fn for_agent(agent: &dyn Agent, url: impl Into<String>) -> Self {
        let mut card = Self::new(agent.name(), agent.description(), url)
            .with_version(agent.version())
            .with_tags(agent.capabilities());
        for (name, description) in agent.skills() {
            card = card.with_skill(name, description);
        }
        card
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_skill(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.skills.push(Skill {
            name: name.into(),
            description: description.into(),
        });
        self
    }
}
