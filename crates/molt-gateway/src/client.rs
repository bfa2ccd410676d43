//! Moltbook API client
//!
//! Key design: one logical call either fully succeeds with a parsed JSON body
//! or fails once with an aggregated error. Transient failures (transport
//! errors, timeouts, HTTP >= 400, unparseable bodies) are retried with linear
//! backoff; allowlist violations fail before any I/O and are never retried.

use crate::allowlist::Allowlist;
use crate::auth::ApiKey;
use crate::retry::RetryPolicy;
use crate::types::{extract_posts, CommentRequest};
use async_trait::async_trait;
use molt_core::{AgentConfig, CommentAck, MoltError, Post, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

// Error bodies are echoed into messages; keep them short
const MAX_ERROR_BODY_CHARS: usize = 300;

/// Remote forum operations the scheduler depends on (allows mocking in tests)
#[async_trait]
pub trait ForumGateway: Send + Sync {
    /// Newest posts of `board`, in feed order
    async fn fetch_posts(&self, board: &str, limit: usize) -> Result<Vec<Post>>;

    /// Create a comment on `post_id`
    async fn post_comment(&self, post_id: &str, content: &str) -> Result<CommentAck>;
}

/// reqwest-backed gateway
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    api_base: Url,
    allowlist: Allowlist,
    retry: RetryPolicy,
}

impl HttpGateway {
    /// Gateway pinned to the production Moltbook origin
    pub fn new(config: &AgentConfig, api_key: &ApiKey) -> Result<Self> {
        Self::with_allowlist(config, api_key, Allowlist::default())
    }

    /// Gateway pinned to a custom origin
    pub fn with_allowlist(
        config: &AgentConfig,
        api_key: &ApiKey,
        allowlist: Allowlist,
    ) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key.expose()))
            .map_err(|_| MoltError::Config("API key is not a valid header value".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // Redirects could leave the pinned origin
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| MoltError::Other(format!("Failed to build HTTP client: {}", e)))?;

        let api_base = Url::parse(&config.api_base)
            .map_err(|e| MoltError::Config(format!("invalid api_base {}: {}", config.api_base, e)))?;

        Ok(Self {
            client,
            api_base,
            allowlist,
            retry: RetryPolicy::new(config.max_retries),
        })
    }

    /// Override the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// `api_base` with `segments` appended, each percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                MoltError::Config(format!("api_base cannot take a path: {}", self.api_base))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send one logical request with allowlist check and retries
    async fn request(&self, method: Method, url: Url, body: Option<&Value>) -> Result<Value> {
        self.allowlist.check(&url)?;

        let mut last_error = String::new();
        for attempt in 1..=self.retry.max_attempts {
            debug!(
                "{} {} (attempt {}/{})",
                method,
                url.path(),
                attempt,
                self.retry.max_attempts
            );

            match self.attempt(method.clone(), url.clone(), body).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    last_error = e;
                    match self.retry.delay_after(attempt) {
                        Some(delay) => {
                            warn!(
                                "Request to {} failed ({}). Retrying in {:.1}s ({}/{})",
                                url.path(),
                                last_error,
                                delay.as_secs_f64(),
                                attempt,
                                self.retry.max_attempts
                            );
                            tokio::time::sleep(delay).await;
                        }
                        None => break,
                    }
                }
            }
        }

        error!(
            "Request to {} failed after {} attempts: {}",
            url.path(),
            self.retry.max_attempts,
            last_error
        );
        Err(MoltError::RequestFailed {
            attempts: self.retry.max_attempts,
            last_error,
        })
    }

    /// A single attempt; the error string describes why it failed
    async fn attempt(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> std::result::Result<Value, String> {
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| format!("transport error: {}", e.without_url()))?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let text = response.text().await.unwrap_or_default();
            let text: String = text.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(format!("HTTP {}: {}", status.as_u16(), text));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| format!("invalid JSON response (HTTP {}): {}", status.as_u16(), e.without_url()))
    }
}

#[async_trait]
impl ForumGateway for HttpGateway {
    #[instrument(skip(self))]
    async fn fetch_posts(&self, board: &str, limit: usize) -> Result<Vec<Post>> {
        let mut url = self.endpoint(&["posts"])?;
        url.query_pairs_mut()
            .append_pair("submolt", board)
            .append_pair("sort", "new")
            .append_pair("limit", &limit.to_string());

        let body = self.request(Method::GET, url, None).await?;
        Ok(extract_posts(&body))
    }

    #[instrument(skip(self, content), fields(content_len = content.len()))]
    async fn post_comment(&self, post_id: &str, content: &str) -> Result<CommentAck> {
        let url = self.endpoint(&["posts", post_id, "comments"])?;
        let body = serde_json::to_value(CommentRequest { content })?;

        let ack = self.request(Method::POST, url, Some(&body)).await?;
        Ok(CommentAck(ack))
    }
}
