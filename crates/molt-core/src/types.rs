//! Core domain types shared by the store, gateway and orchestrator

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A post as returned by the board feed
///
/// Read-only snapshot; the agent never mutates a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl Post {
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
        }
    }

    /// Build a post from a loosely shaped JSON object.
    ///
    /// Numeric ids are stringified and missing fields become empty strings,
    /// so a malformed entry yields a post with an empty id that the
    /// scheduler skips.
    pub fn from_value(value: &Value) -> Self {
        let id = match value.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        let text = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Self {
            id,
            title: text("title"),
            content: text("content"),
        }
    }

    /// Title and body joined by a newline, trimmed
    pub fn combined_text(&self) -> String {
        format!("{}\n{}", self.title, self.content).trim().to_string()
    }
}

/// A reply the decision engine wants to post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyCandidate {
    pub post_id: String,
    pub text: String,
    pub fingerprint: String,
}

/// Acknowledgement object returned by the comment endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentAck(pub Value);

/// Read-only view of the reply fingerprints already used
pub trait FingerprintLedger {
    fn has_fingerprint(&self, fingerprint: &str) -> bool;
}
