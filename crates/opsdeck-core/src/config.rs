use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Top-level configuration for the opsdeck application.
///
/// Loaded from `~/.opsdeck/config.toml` by default. Each section corresponds
/// to a subsystem or cross-cutting concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OpsdeckConfig {
    pub execution: ExecutionConfig,
    pub approvals: ApprovalConfig,
    pub logging: LoggingConfig,
}

impl OpsdeckConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: OpsdeckConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// Settings for the action execution backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Base URL of the execution backend.
    pub base_url: String,
    /// Whether the runner advertises that it accepts streamed responses.
    pub streaming_enabled: bool,
    /// Connection timeout for outbound execution requests.
    pub connect_timeout_seconds: u64,
    /// Capacity of the action-start broadcast channel.
    pub event_channel_capacity: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8787".to_string(),
            streaming_enabled: true,
            connect_timeout_seconds: 10,
            event_channel_capacity: 256,
        }
    }
}

/// Settings for the pending-approval queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApprovalConfig {
    /// Seconds before an unconfirmed result is pruned.
    pub timeout_seconds: u64,
    /// Maximum number of pending results held at once.
    pub max_pending: usize,
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 900,
            max_pending: 64,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Maximum log level: trace, debug, info, warn, or error.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
