//! Authentication for the Moltbook API
//!
//! The agent authenticates with a single bearer key read from
//! `MOLTBOOK_API_KEY`. The key is wrapped in [`ApiKey`] so it cannot leak
//! through `Debug` or `Display` formatting.

use molt_core::{MoltError, Result};
use std::env;
use std::fmt;

/// Environment variable holding the Moltbook API key
pub const API_KEY_ENV: &str = "MOLTBOOK_API_KEY";

/// Bearer credential with redacted formatting
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw secret, for building the Authorization header only
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Get the Moltbook API key from the environment
pub fn get_api_key() -> Result<ApiKey> {
    match env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => {
            tracing::debug!("Using {}", API_KEY_ENV);
            Ok(ApiKey::new(key.trim()))
        }
        _ => Err(MoltError::Config(format!(
            "Missing {} in environment. Export it before starting the agent (never commit real keys).",
            API_KEY_ENV
        ))),
    }
}
