//! Agentline configuration
//!
//! Loaded from `~/.agentline/config.toml` (or an explicit path). A missing
//! default file means built-in defaults: an orchestrator on port 9000 and the
//! four research stages on ports 9001-9004.
//!
//! ```toml
//! [server]
//! port = 9000
//! allowed_origins = ["http://localhost:3000"]
//!
//! [client]
//! stage_timeout_secs = 30
//! stage_attempts = 3
//!
//! [[stages]]
//! name = "data_gathering"
//! url = "http://localhost:9001/"
//!
//! [[stages]]
//! name = "quantitative_analysis"
//! url = "http://localhost:9002/"
//! inputs = { data = "data_gathering" }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{client, server};
use crate::paths;
use crate::retry::RetryConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS; `"*"` allows any
    pub allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: server::DEFAULT_HOST.to_string(),
            port: server::ORCHESTRATOR_PORT,
            allowed_origins: server::DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|o| o.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub timeout_secs: u64,
    pub stage_timeout_secs: u64,
    pub stage_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout_secs: client::PRIMARY_TIMEOUT_SECS,
            stage_timeout_secs: client::STAGE_TIMEOUT_SECS,
            stage_attempts: client::STAGE_ATTEMPTS,
            retry_delay_ms: client::RETRY_DELAY_MS,
        }
    }
}

impl ClientSettings {
    pub fn primary_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_secs)
    }

    pub fn stage_retry(&self) -> RetryConfig {
        RetryConfig::fixed(
            self.stage_attempts,
            Duration::from_millis(self.retry_delay_ms),
        )
    }
}

/// One pipeline stage: a named downstream agent and where its inputs come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    pub name: String,
    pub url: String,
    /// Request key -> name of an earlier stage whose result fills it
    #[serde(default)]
    pub inputs: BTreeMap<String, String>,
}

impl StageConfig {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            inputs: BTreeMap::new(),
        }
    }

    pub fn with_input(mut self, key: &str, stage: &str) -> Self {
        self.inputs.insert(key.to_string(), stage.to_string());
        self
    }

    /// Port of the stage URL, used when serving a stand-in for it
    pub fn port(&self) -> Option<u16> {
        url::Url::parse(&self.url).ok()?.port_or_known_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentlineConfig {
    pub server: ServerSettings,
    pub client: ClientSettings,
    pub stages: Vec<StageConfig>,
}

impl Default for AgentlineConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            client: ClientSettings::default(),
            stages: default_stages(),
        }
    }
}

/// The research pipeline: gather, analyse twice, then report.
fn default_stages() -> Vec<StageConfig> {
    vec![
        StageConfig::new("data_gathering", "http://localhost:9001/"),
        StageConfig::new("quantitative_analysis", "http://localhost:9002/")
            .with_input("data", "data_gathering"),
        StageConfig::new("qualitative_analysis", "http://localhost:9003/")
            .with_input("data", "data_gathering"),
        StageConfig::new("report_generation", "http://localhost:9004/")
            .with_input("data_analysis", "data_gathering")
            .with_input("quantitative_analysis", "quantitative_analysis")
            .with_input("qualitative_analysis", "qualitative_analysis"),
    ]
}

impl AgentlineConfig {
    /// Load from `path`, or from the default location when `None`.
    /// Environment overrides are applied and the result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = paths::config_file();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    tracing::debug!("No config at {}, using defaults", default_path.display());
                    Self::default()
                }
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `AGENTLINE_HOST` / `AGENTLINE_PORT` from `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("AGENTLINE_HOST").filter(|h| !h.is_empty()) {
            self.server.host = host;
        }
        if let Some(port) = lookup("AGENTLINE_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid AGENTLINE_PORT: {}", port),
            }
        }
    }

    /// Stage names must be unique and inputs may only name earlier stages.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stages.is_empty() {
            return Err(ConfigError::Invalid("pipeline has no stages".to_string()));
        }
        if self.client.timeout_secs == 0 || self.client.stage_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "client timeouts must be at least 1 second".to_string(),
            ));
        }
        if self.client.stage_attempts == 0 {
            return Err(ConfigError::Invalid(
                "client.stage_attempts must be at least 1".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for stage in &self.stages {
            if stage.name.trim().is_empty() {
                return Err(ConfigError::Invalid("stage with empty name".to_string()));
            }
            for (key, source) in &stage.inputs {
                if !seen.contains(source.as_str()) {
                    return Err(ConfigError::Invalid(format!(
                        "stage '{}' input '{}' refers to '{}', which does not run before it",
                        stage.name, key, source
                    )));
                }
            }
            if !seen.insert(stage.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate stage name '{}'",
                    stage.name
                )));
            }
        }
        Ok(())
    }

    pub fn stage(&self, name: &str) -> Option<&StageConfig> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Address of the orchestrator endpoint
    pub fn orchestrator_url(&self) -> String {
        format!("http://{}:{}/", self.server.host, self.server.port)
    }
}
