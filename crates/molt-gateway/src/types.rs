//! Wire types for the Moltbook API

use molt_core::Post;
use serde::Serialize;
use serde_json::Value;

/// Comment creation request body
#[derive(Debug, Clone, Serialize)]
pub struct CommentRequest<'a> {
    pub content: &'a str,
}

/// Flatten a post-listing response into posts, in feed order.
///
/// Accepted shapes, first match wins:
/// - `{"data": {"posts": [...]}}`
/// - `{"posts": [...]}`
/// - `{"data": [...]}`
/// - `[...]`
///
/// Anything else is treated as an empty listing.
pub fn extract_posts(body: &Value) -> Vec<Post> {
    let items = body
        .get("data")
        .and_then(|data| data.get("posts"))
        .and_then(Value::as_array)
        .or_else(|| body.get("posts").and_then(Value::as_array))
        .or_else(|| body.get("data").and_then(Value::as_array))
        .or_else(|| body.as_array());

    items
        .map(|items| items.iter().map(Post::from_value).collect())
        .unwrap_or_default()
}
