//! Application-wide constants

/// Agent client defaults
pub mod client {
    /// Timeout for the primary (caller -> orchestrator) path
    pub const PRIMARY_TIMEOUT_SECS: u64 = 120;
    /// Timeout for inter-agent (orchestrator -> stage) calls
    pub const STAGE_TIMEOUT_SECS: u64 = 30;
    /// Attempts per inter-agent call, including the first
    pub const STAGE_ATTEMPTS: u32 = 3;
    /// Fixed delay between inter-agent attempts
    pub const RETRY_DELAY_MS: u64 = 1000;
    /// Timeout for discovery document fetches
    pub const CARD_TIMEOUT_SECS: u64 = 2;
}

/// Endpoint defaults
pub mod server {
    pub const DEFAULT_HOST: &str = "127.0.0.1";
    pub const ORCHESTRATOR_PORT: u16 = 9000;
    /// Default port of the built-in tool server
    pub const TOOLS_PORT: u16 = 9010;
    pub const CARD_PATH: &str = "/.well-known/agent.json";
    pub const DEFAULT_ALLOWED_ORIGINS: &[&str] =
        &["http://localhost:3000", "http://127.0.0.1:3000"];
}

/// Task bookkeeping
pub mod task {
    /// Execution log entries kept per task manager
    pub const EXECUTION_LOG_LIMIT: usize = 100;
}

/// Filesystem layout
pub mod paths {
    pub const CONFIG_DIR_NAME: &str = ".agentline";
    pub const CONFIG_FILE_NAME: &str = "config.toml";
}
