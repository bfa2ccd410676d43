//! In-memory gateway for testing

use crate::client::ForumGateway;
use async_trait::async_trait;
use molt_core::{CommentAck, MoltError, Post, Result};
use serde_json::json;
use std::sync::Mutex;

/// A comment the mock received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedComment {
    pub post_id: String,
    pub content: String,
}

/// Mock gateway serving a fixed feed and recording every call
#[derive(Debug, Default)]
pub struct MockGateway {
    posts: Vec<Post>,
    fail_fetch: bool,
    fail_comment: bool,
    fetches: Mutex<Vec<(String, usize)>>,
    comments: Mutex<Vec<RecordedComment>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(mut self, posts: Vec<Post>) -> Self {
        self.posts = posts;
        self
    }

    /// Make every fetch fail as if retries were exhausted
    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    /// Make every comment fail as if retries were exhausted
    pub fn failing_comment(mut self) -> Self {
        self.fail_comment = true;
        self
    }

    /// `(board, limit)` of every fetch call
    pub fn fetches(&self) -> Vec<(String, usize)> {
        self.fetches.lock().map(|f| f.clone()).unwrap_or_default()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches().len()
    }

    pub fn comments(&self) -> Vec<RecordedComment> {
        self.comments.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

fn exhausted(what: &str) -> MoltError {
    MoltError::RequestFailed {
        attempts: 3,
        last_error: format!("mock {} failure", what),
    }
}

#[async_trait]
impl ForumGateway for MockGateway {
    async fn fetch_posts(&self, board: &str, limit: usize) -> Result<Vec<Post>> {
        if let Ok(mut fetches) = self.fetches.lock() {
            fetches.push((board.to_string(), limit));
        }
        if self.fail_fetch {
            return Err(exhausted("fetch"));
        }
        Ok(self.posts.iter().take(limit).cloned().collect())
    }

    async fn post_comment(&self, post_id: &str, content: &str) -> Result<CommentAck> {
        if self.fail_comment {
            return Err(exhausted("comment"));
        }
        if let Ok(mut comments) = self.comments.lock() {
            comments.push(RecordedComment {
                post_id: post_id.to_string(),
                content: content.to_string(),
            });
        }
        Ok(CommentAck(json!({"success": true, "post_id": post_id})))
    }
}
