//! # molt-core
//!
//! Core types for the molt polling agent.
//!
//! The agent watches one Moltbook board, decides locally whether a post is
//! worth answering, and posts at most one reply per cycle under a rolling
//! hourly budget. This crate holds what every other crate shares:
//!
//! - [`MoltError`] and the [`Result`] alias
//! - [`AgentConfig`] and its loader
//! - Domain types: [`Post`], [`ReplyCandidate`], [`CommentAck`]

mod config;
mod error;
mod types;

pub use config::{parse_env_bool, AgentConfig, DRY_RUN_ENV, EXPECTED_AGENT_NAME};
pub use error::{MoltError, Result};
pub use types::*;
