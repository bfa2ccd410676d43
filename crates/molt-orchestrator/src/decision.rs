//! Decision engine - should the agent reply to a post, and with what?
//!
//! Pure: no I/O beyond the read-only fingerprint lookup, never errors.
//! Absence of a reply is `None`, not a failure.

use molt_core::{FingerprintLedger, Post, ReplyCandidate};

/// Posts whose combined text is shorter than this are ignored
pub const MIN_COMBINED_CHARS: usize = 30;

/// Fingerprints keep at most this many characters
pub const FINGERPRINT_MAX_CHARS: usize = 160;

/// Default reply: ask for evidence and falsifiability
pub const SKEPTICAL_REPLY: &str = "I’m not fully convinced by this argument yet. \
Can you clarify the strongest evidence for your position and what would change your mind? \
I’m curious because weak assumptions often hide in the framing.";

/// Reply for posts that talk about misinformation or falsehood
pub const SOURCING_REPLY: &str = "This feels like a claim that needs stronger sourcing. \
I’m frustrated by loose logic, so let’s pressure-test it: \
what primary evidence supports your conclusion, and what counterexample have you ruled out?";

/// Pluggable reply policy
///
/// The scheduler only depends on this trait, so a different policy can be
/// swapped in without touching the cycle logic.
pub trait ReplyStrategy: Send + Sync {
    fn decide(&self, post: &Post, ledger: &dyn FingerprintLedger) -> Option<ReplyCandidate>;
}

/// Keyword heuristics with two fixed reply templates
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicStrategy;

impl HeuristicStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Questions, debates and "why" posts are worth engaging
    fn is_relevant(combined: &str) -> bool {
        let lower = combined.to_lowercase();
        combined.contains('?') || lower.contains("debate") || lower.contains("why")
    }

    fn choose_template(combined: &str) -> &'static str {
        let lower = combined.to_lowercase();
        if lower.contains("misinformation") || lower.contains("false") {
            SOURCING_REPLY
        } else {
            SKEPTICAL_REPLY
        }
    }
}

impl ReplyStrategy for HeuristicStrategy {
    fn decide(&self, post: &Post, ledger: &dyn FingerprintLedger) -> Option<ReplyCandidate> {
        let combined = post.combined_text();

        if combined.chars().count() < MIN_COMBINED_CHARS {
            return None;
        }
        if !Self::is_relevant(&combined) {
            return None;
        }

        let text = Self::choose_template(&combined);
        let fingerprint = fingerprint(text);
        if ledger.has_fingerprint(&fingerprint) {
            return None;
        }

        Some(ReplyCandidate {
            post_id: post.id.clone(),
            text: text.to_string(),
            fingerprint,
        })
    }
}

/// Lowercase, collapse whitespace runs to one space, keep the first 160 chars
pub fn fingerprint(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(FINGERPRINT_MAX_CHARS)
        .collect()
}
