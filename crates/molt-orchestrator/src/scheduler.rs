//! Scheduler - the fetch → decide → act → persist cycle
//!
//! Each cycle walks `RateCheck → Fetch → Scan → Act → Persist → Idle` and
//! takes at most one action:
//! - the hourly budget is checked first; an exhausted budget skips the fetch
//! - posts are scanned in feed order, skipping empty and already-replied ids
//! - the first post the strategy accepts is answered (or previewed in
//!   dry-run), then the post id, reply fingerprint and action timestamp are
//!   persisted and the cycle ends
//!
//! Dry-run still persists all three records, so it consumes the hourly budget
//! and a previewed post is never answered later.
//!
//! No state is cached between cycles; every decision re-reads the store.

use crate::decision::ReplyStrategy;
use molt_core::{AgentConfig, ReplyCandidate, Result};
use molt_gateway::ForumGateway;
use molt_store::StateStore;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, error, info};

/// Phases of a single cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    RateCheck,
    Fetch,
    Scan,
    Act,
    Persist,
    Idle,
}

/// How a cycle ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Hourly budget exhausted; nothing was fetched
    RateLimited { actions_in_window: usize },
    /// Feed fetched but no post qualified
    NoCandidate { fetched: usize },
    /// One post was answered (or previewed in dry-run)
    Replied { post_id: String, dry_run: bool },
}

/// Drives cycles against an injected store, gateway and strategy
pub struct Scheduler<S, G, D> {
    config: AgentConfig,
    store: S,
    gateway: G,
    strategy: D,
}

impl<S, G, D> Scheduler<S, G, D>
where
    S: StateStore,
    G: ForumGateway,
    D: ReplyStrategy,
{
    pub fn new(config: AgentConfig, store: S, gateway: G, strategy: D) -> Self {
        Self {
            config,
            store,
            gateway,
            strategy,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn strategy(&self) -> &D {
        &self.strategy
    }

    /// Run exactly one cycle
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        info!("Starting cycle for m/{}", self.config.submolt);

        enter(CyclePhase::RateCheck);
        let recent = self.store.count_actions_in_last_hour()?;
        if recent >= self.config.max_comments_per_hour {
            info!(
                "Rate limit: {}/{} comments in the last hour. Skipping cycle.",
                recent, self.config.max_comments_per_hour
            );
            enter(CyclePhase::Idle);
            return Ok(CycleOutcome::RateLimited {
                actions_in_window: recent,
            });
        }

        enter(CyclePhase::Fetch);
        let posts = self
            .gateway
            .fetch_posts(&self.config.submolt, self.config.fetch_limit)
            .await?;
        info!("Fetched {} posts from m/{}.", posts.len(), self.config.submolt);

        enter(CyclePhase::Scan);
        for post in &posts {
            if post.id.is_empty() {
                debug!("Skipping post without id");
                continue;
            }
            if self.store.has_replied(&post.id)? {
                debug!("Already replied to {}", post.id);
                continue;
            }

            let snapshot = self.store.snapshot()?;
            let Some(candidate) = self.strategy.decide(post, &snapshot) else {
                continue;
            };

            enter(CyclePhase::Act);
            self.act(&candidate).await?;

            enter(CyclePhase::Persist);
            self.persist(&candidate)?;

            enter(CyclePhase::Idle);
            return Ok(CycleOutcome::Replied {
                post_id: candidate.post_id,
                dry_run: self.config.dry_run,
            });
        }

        debug!("No qualifying post in this batch");
        enter(CyclePhase::Idle);
        Ok(CycleOutcome::NoCandidate {
            fetched: posts.len(),
        })
    }

    async fn act(&self, candidate: &ReplyCandidate) -> Result<()> {
        if self.config.dry_run {
            info!(
                "[DRY_RUN] Would reply to post {}: {}",
                candidate.post_id, candidate.text
            );
            return Ok(());
        }

        self.gateway
            .post_comment(&candidate.post_id, &candidate.text)
            .await?;
        info!("Posted reply to {}", candidate.post_id);
        Ok(())
    }

    fn persist(&self, candidate: &ReplyCandidate) -> Result<()> {
        self.store.mark_replied(&candidate.post_id)?;
        self.store.add_advice_fingerprint(&candidate.fingerprint)?;
        self.store.record_action_now()
    }

    /// Uniformly random whole seconds in `[min_loop_seconds, max_loop_seconds]`
    pub fn next_delay(&self) -> Duration {
        let min = self.config.min_loop_seconds;
        let max = self.config.max_loop_seconds.max(min);
        Duration::from_secs(rand::thread_rng().gen_range(min..=max))
    }

    /// Run cycles until a fatal error, sleeping a random delay between them
    pub async fn run_forever(&self) -> Result<()> {
        self.run_loop(0).await
    }

    /// Run up to `max_cycles` cycles (0 = unlimited).
    ///
    /// A failed cycle is logged and the loop carries on after the normal
    /// sleep; only fatal errors (store integrity, allowlist, configuration)
    /// end the loop early.
    pub async fn run_loop(&self, max_cycles: usize) -> Result<()> {
        let mut cycle: usize = 0;
        loop {
            cycle += 1;

            match self.run_cycle().await {
                Ok(outcome) => debug!("Cycle {} finished: {:?}", cycle, outcome),
                Err(e) if e.is_fatal() => {
                    error!("Cycle {} hit a fatal error: {}", cycle, e);
                    return Err(e);
                }
                Err(e) => error!("Cycle {} failed: {}", cycle, e),
            }

            if max_cycles > 0 && cycle >= max_cycles {
                return Ok(());
            }

            let delay = self.next_delay();
            info!("Sleeping {}s before next cycle...", delay.as_secs());
            tokio::time::sleep(delay).await;
        }
    }
}

fn enter(phase: CyclePhase) {
    debug!(?phase, "Cycle phase");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::HeuristicStrategy;
    use molt_gateway::MockGateway;
    use molt_store::MemoryStateStore;

    fn scheduler(min: u64, max: u64) -> Scheduler<MemoryStateStore, MockGateway, HeuristicStrategy> {
        let mut config = AgentConfig::for_submolt("general");
        config.min_loop_seconds = min;
        config.max_loop_seconds = max;
        Scheduler::new(
            config,
            MemoryStateStore::new(),
            MockGateway::new(),
            HeuristicStrategy,
        )
    }

    #[test]
    fn test_next_delay_within_bounds() {
        let s = scheduler(45, 110);
        for _ in 0..200 {
            let delay = s.next_delay().as_secs();
            assert!((45..=110).contains(&delay), "{delay}");
        }
    }

    #[test]
    fn test_next_delay_fixed_when_bounds_equal() {
        let s = scheduler(7, 7);
        assert_eq!(s.next_delay(), Duration::from_secs(7));
    }

    #[tokio::test]
    async fn test_empty_feed_is_no_candidate() {
        let s = scheduler(0, 0);
        assert_eq!(
            s.run_cycle().await.unwrap(),
            CycleOutcome::NoCandidate { fetched: 0 }
        );
        assert_eq!(s.gateway().fetches(), vec![("general".to_string(), 10)]);
    }
}
