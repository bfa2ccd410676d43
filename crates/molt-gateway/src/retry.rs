//! Linear retry backoff

use std::time::Duration;

/// Default pause unit between attempts
pub const DEFAULT_BACKOFF_STEP: Duration = Duration::from_millis(1200);

/// How many times a logical call is attempted and how long to wait between
/// attempts
///
/// The wait after failed attempt `n` is `backoff_step * n`, so with the
/// default step the pauses are 1.2s, 2.4s, 3.6s, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_step: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_step: DEFAULT_BACKOFF_STEP,
        }
    }

    pub fn with_backoff_step(mut self, step: Duration) -> Self {
        self.backoff_step = step;
        self
    }

    /// Pause after failed attempt `attempt` (1-indexed), or `None` when no
    /// attempts remain
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        Some(self.backoff_step * attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}
