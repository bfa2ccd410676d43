//! The persisted state document

use molt_core::FingerprintLedger;
use serde::{Deserialize, Serialize};

/// Length of the sliding action window in seconds
pub const ACTION_WINDOW_SECS: f64 = 3600.0;

/// Everything the agent remembers across restarts
///
/// All three containers are required when deserializing: a document missing
/// one of them is treated as corrupt rather than silently defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    /// Posts already answered (or previewed in dry-run)
    pub replied_post_ids: Vec<String>,

    /// Fingerprints of reply texts already used
    pub advice_fingerprints: Vec<String>,

    /// Epoch seconds of past actions
    #[serde(rename = "comment_timestamps")]
    pub action_timestamps: Vec<f64>,
}

impl StateDocument {
    pub fn has_replied(&self, post_id: &str) -> bool {
        self.replied_post_ids.iter().any(|id| id == post_id)
    }

    /// Returns true if the id was not already present
    pub fn insert_replied(&mut self, post_id: &str) -> bool {
        insert_unique(&mut self.replied_post_ids, post_id)
    }

    pub fn has_advice_fingerprint(&self, fingerprint: &str) -> bool {
        self.advice_fingerprints.iter().any(|fp| fp == fingerprint)
    }

    /// Returns true if the fingerprint was not already present
    pub fn insert_advice_fingerprint(&mut self, fingerprint: &str) -> bool {
        insert_unique(&mut self.advice_fingerprints, fingerprint)
    }

    /// Drop timestamps outside the window ending at `now`.
    ///
    /// Returns the number of entries removed.
    pub fn prune_actions(&mut self, now: f64) -> usize {
        let before = self.action_timestamps.len();
        self.action_timestamps
            .retain(|ts| (now - ts) < ACTION_WINDOW_SECS);
        before - self.action_timestamps.len()
    }

    pub fn push_action(&mut self, timestamp: f64) {
        self.action_timestamps.push(timestamp);
    }
}

impl FingerprintLedger for StateDocument {
    fn has_fingerprint(&self, fingerprint: &str) -> bool {
        self.has_advice_fingerprint(fingerprint)
    }
}

fn insert_unique(items: &mut Vec<String>, value: &str) -> bool {
    if items.iter().any(|item| item == value) {
        return false;
    }
    items.push(value.to_string());
    true
}
