//! Configuration management for the molt agent
//!
//! The agent reads a single `config.json` at startup. Every field except the
//! identity and the board has a default, and `DRY_RUN` in the environment
//! overrides the file's dry-run flag. Validation happens here so the core is
//! never constructed from an inconsistent config.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::{MoltError, Result};

/// The only agent identity this binary will run as
pub const EXPECTED_AGENT_NAME: &str = "3mrAgent";

/// Environment variable that overrides `dry_run`
pub const DRY_RUN_ENV: &str = "DRY_RUN";

/// Agent configuration
///
/// Immutable after [`AgentConfig::load`] returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Agent identity, must equal [`EXPECTED_AGENT_NAME`]
    #[serde(rename = "agent_name")]
    pub name: String,

    /// Board (submolt) to poll
    pub submolt: String,

    /// Base URL of the forum API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Log replies instead of posting them
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,

    /// Rolling one-hour action budget
    #[serde(default = "default_max_comments_per_hour")]
    pub max_comments_per_hour: usize,

    /// Lower bound of the inter-cycle sleep
    #[serde(default = "default_min_loop_seconds")]
    pub min_loop_seconds: u64,

    /// Upper bound of the inter-cycle sleep
    #[serde(default = "default_max_loop_seconds")]
    pub max_loop_seconds: u64,

    /// Posts requested per fetch
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,

    /// Per-attempt HTTP timeout
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    /// Attempts per logical HTTP call
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

// Default value providers
fn default_api_base() -> String {
    "https://www.moltbook.com/api/v1".to_string()
}

fn default_dry_run() -> bool {
    true
}

fn default_max_comments_per_hour() -> usize {
    4
}

fn default_min_loop_seconds() -> u64 {
    45
}

fn default_max_loop_seconds() -> u64 {
    110
}

fn default_fetch_limit() -> usize {
    10
}

fn default_request_timeout_seconds() -> u64 {
    20
}

fn default_max_retries() -> u32 {
    3
}

impl AgentConfig {
    /// Config for the given board with every other field defaulted
    pub fn for_submolt(submolt: impl Into<String>) -> Self {
        Self {
            name: EXPECTED_AGENT_NAME.to_string(),
            submolt: submolt.into(),
            api_base: default_api_base(),
            dry_run: default_dry_run(),
            max_comments_per_hour: default_max_comments_per_hour(),
            min_loop_seconds: default_min_loop_seconds(),
            max_loop_seconds: default_max_loop_seconds(),
            fetch_limit: default_fetch_limit(),
            request_timeout_seconds: default_request_timeout_seconds(),
            max_retries: default_max_retries(),
        }
    }

    /// Load, apply the `DRY_RUN` override and validate
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MoltError::Config(format!(
                "Missing config file: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            MoltError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let dry_run_override = std::env::var(DRY_RUN_ENV).ok();
        Self::from_json(&content, dry_run_override.as_deref())
    }

    /// Parse config JSON; `dry_run_override` is the raw `DRY_RUN` value if set
    pub fn from_json(content: &str, dry_run_override: Option<&str>) -> Result<Self> {
        let mut config: AgentConfig = serde_json::from_str(content)
            .map_err(|e| MoltError::Config(format!("Failed to parse config file: {}", e)))?;

        if let Some(raw) = dry_run_override {
            config.dry_run = parse_env_bool(raw);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.name != EXPECTED_AGENT_NAME {
            return Err(MoltError::Config(format!(
                "config.json must keep agent_name exactly '{}'.",
                EXPECTED_AGENT_NAME
            )));
        }
        if self.submolt.trim().is_empty() {
            return Err(MoltError::Config("submolt must not be empty".to_string()));
        }
        if self.min_loop_seconds > self.max_loop_seconds {
            return Err(MoltError::Config(format!(
                "min_loop_seconds ({}) exceeds max_loop_seconds ({})",
                self.min_loop_seconds, self.max_loop_seconds
            )));
        }
        if self.max_retries == 0 {
            return Err(MoltError::Config("max_retries must be at least 1".to_string()));
        }
        if self.fetch_limit == 0 {
            return Err(MoltError::Config("fetch_limit must be at least 1".to_string()));
        }
        if self.request_timeout_seconds == 0 {
            return Err(MoltError::Config(
                "request_timeout_seconds must be at least 1".to_string(),
            ));
        }
        Url::parse(&self.api_base)
            .map_err(|e| MoltError::Config(format!("invalid api_base {}: {}", self.api_base, e)))?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// `1`, `true`, `yes` and `on` (any case) are true; everything else is false
pub fn parse_env_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
