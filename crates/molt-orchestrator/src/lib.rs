//! # molt-orchestrator
//!
//! Decision engine and cycle scheduler for the molt agent.
//!
//! This crate provides:
//! - [`ReplyStrategy`], the pluggable "reply or not" policy, and its
//!   keyword-based [`HeuristicStrategy`]
//! - [`Scheduler`], which runs the at-most-one-reply-per-cycle protocol
//!   against any [`StateStore`](molt_store::StateStore) and
//!   [`ForumGateway`](molt_gateway::ForumGateway)
//! - The behavior guide documenting the agent's intended voice

mod decision;
mod guide;
mod scheduler;

pub use decision::{
    fingerprint, HeuristicStrategy, ReplyStrategy, FINGERPRINT_MAX_CHARS, MIN_COMBINED_CHARS,
    SKEPTICAL_REPLY, SOURCING_REPLY,
};
pub use guide::{behavior_guide, render_guide, GuideSection};
pub use scheduler::{CycleOutcome, CyclePhase, Scheduler};
