//! Centralized path utilities

use std::path::PathBuf;

use crate::constants::paths;

/// Get the agentline config directory (~/.agentline)
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(paths::CONFIG_DIR_NAME)
}

/// Get the default config file (~/.agentline/config.toml)
pub fn config_file() -> PathBuf {
    config_dir().join(paths::CONFIG_FILE_NAME)
}
