//! Destination allowlist
//!
//! The gateway may only talk to one origin. Every request URL is checked
//! against the pinned scheme, host and effective port before anything is
//! sent; a mismatch is a security error and is never retried.

use molt_core::{MoltError, Result};
use reqwest::Url;

/// Origin the production agent is pinned to
pub const MOLTBOOK_ORIGIN: &str = "https://www.moltbook.com";

/// A single permitted scheme + host (+ port)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allowlist {
    scheme: String,
    host: String,
    port: Option<u16>,
}

impl Allowlist {
    /// Pin the origin of `origin` (path and query are ignored)
    pub fn from_origin(origin: &str) -> Result<Self> {
        let url = Url::parse(origin)
            .map_err(|e| MoltError::Config(format!("invalid allowlist origin {}: {}", origin, e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| MoltError::Config(format!("allowlist origin has no host: {}", origin)))?;

        Ok(Self {
            scheme: url.scheme().to_string(),
            host: host.to_ascii_lowercase(),
            port: url.port_or_known_default(),
        })
    }

    /// Reject any URL outside the pinned origin
    pub fn check(&self, url: &Url) -> Result<()> {
        let host_matches = url
            .host_str()
            .is_some_and(|host| host.eq_ignore_ascii_case(&self.host));

        if url.scheme() != self.scheme
            || !host_matches
            || url.port_or_known_default() != self.port
            || !url.username().is_empty()
            || url.password().is_some()
        {
            return Err(MoltError::Security(redact(url)));
        }
        Ok(())
    }
}

impl Default for Allowlist {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            host: "www.moltbook.com".to_string(),
            port: Some(443),
        }
    }
}

// Userinfo never reaches error messages
fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    let _ = shown.set_username("");
    let _ = shown.set_password(None);
    shown.to_string()
}
