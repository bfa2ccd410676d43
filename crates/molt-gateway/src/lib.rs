//! # molt-gateway
//!
//! HTTP gateway between the molt agent and the Moltbook API.
//!
//! - Single-origin allowlist checked before any network I/O
//! - Bearer authentication installed once, never logged
//! - Linear-backoff retries with one aggregated failure on exhaustion
//! - Tolerant parsing of the post-listing response shape
//!
//! The scheduler only sees the [`ForumGateway`] trait; [`HttpGateway`] is
//! the real implementation and [`MockGateway`] the in-memory one used in
//! tests.

mod allowlist;
mod auth;
mod client;
mod mock;
mod retry;
mod types;

pub use allowlist::{Allowlist, MOLTBOOK_ORIGIN};
pub use auth::{get_api_key, ApiKey, API_KEY_ENV};
pub use client::{ForumGateway, HttpGateway};
pub use mock::{MockGateway, RecordedComment};
pub use retry::{RetryPolicy, DEFAULT_BACKOFF_STEP};
pub use types::extract_posts;
