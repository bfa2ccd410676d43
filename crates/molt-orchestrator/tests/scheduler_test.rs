//! Integration tests for the cycle scheduler
//!
//! Tests the full cycle against the in-memory store and mock gateway:
//! - Rate limit gate skipping the fetch
//! - Dry-run persisting dedup state without posting
//! - At most one reply per cycle, in feed order
//! - Duplicate content suppression across cycles
//! - Loop behavior on transient and fatal errors

use molt_core::{AgentConfig, FingerprintLedger, MoltError, Post, ReplyCandidate, Result};
use molt_gateway::{MockGateway, RecordedComment};
use molt_orchestrator::{
    fingerprint, CycleOutcome, HeuristicStrategy, ReplyStrategy, Scheduler, SKEPTICAL_REPLY,
    SOURCING_REPLY,
};
use molt_store::{epoch_now, FileStateStore, MemoryStateStore, StateDocument, StateStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Helper to build a config with no inter-cycle sleep
fn test_config(dry_run: bool) -> AgentConfig {
    let mut config = AgentConfig::for_submolt("philosophy");
    config.dry_run = dry_run;
    config.min_loop_seconds = 0;
    config.max_loop_seconds = 0;
    config
}

/// A post the heuristic strategy accepts with the skeptical template
fn question_post(id: &str) -> Post {
    Post::new(
        id,
        "Why would an agent ever change its mind",
        "Genuinely curious what others think here?",
    )
}

/// A post the heuristic strategy accepts with the sourcing template
fn misinformation_post(id: &str) -> Post {
    Post::new(
        id,
        "This thread is full of misinformation",
        "Why does nobody cite anything?",
    )
}

/// Strategy wrapper counting how many posts were evaluated
struct CountingStrategy {
    inner: HeuristicStrategy,
    calls: AtomicUsize,
}

impl CountingStrategy {
    fn new() -> Self {
        Self {
            inner: HeuristicStrategy,
            calls: AtomicUsize::new(0),
        }
    }
}

impl ReplyStrategy for CountingStrategy {
    fn decide(&self, post: &Post, ledger: &dyn FingerprintLedger) -> Option<ReplyCandidate> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.decide(post, ledger)
    }
}

/// Store whose document is always unreadable
struct CorruptStore;

impl StateStore for CorruptStore {
    fn load(&self) -> Result<StateDocument> {
        Err(MoltError::StoreIntegrity("truncated document".to_string()))
    }

    fn save(&self, _doc: &StateDocument) -> Result<()> {
        Err(MoltError::StoreIntegrity("truncated document".to_string()))
    }
}

#[tokio::test]
async fn test_rate_limit_skips_fetch() {
    let now = epoch_now();
    let store = MemoryStateStore::with_document(StateDocument {
        action_timestamps: vec![now - 3000.0, now - 2000.0, now - 1000.0, now - 10.0],
        ..Default::default()
    });
    let gateway = MockGateway::new().with_posts(vec![question_post("p1")]);
    let scheduler = Scheduler::new(test_config(false), store, gateway, HeuristicStrategy);

    let outcome = scheduler.run_cycle().await.unwrap();

    assert_eq!(
        outcome,
        CycleOutcome::RateLimited {
            actions_in_window: 4
        }
    );
    assert_eq!(scheduler.gateway().fetch_count(), 0);
    assert!(scheduler.gateway().comments().is_empty());
}

#[tokio::test]
async fn test_expired_actions_do_not_count() {
    let now = epoch_now();
    let store = MemoryStateStore::with_document(StateDocument {
        action_timestamps: vec![now - 9000.0, now - 8000.0, now - 7000.0, now - 100.0],
        ..Default::default()
    });
    let gateway = MockGateway::new().with_posts(vec![question_post("p1")]);
    let scheduler = Scheduler::new(test_config(false), store, gateway, HeuristicStrategy);

    let outcome = scheduler.run_cycle().await.unwrap();

    assert!(matches!(outcome, CycleOutcome::Replied { .. }));
    assert_eq!(scheduler.gateway().fetch_count(), 1);
    // Expired entries pruned, new action appended
    assert_eq!(scheduler.store().load().unwrap().action_timestamps.len(), 2);
}

#[tokio::test]
async fn test_dry_run_persists_without_posting() {
    let gateway = MockGateway::new().with_posts(vec![question_post("p1")]);
    let scheduler = Scheduler::new(
        test_config(true),
        MemoryStateStore::new(),
        gateway,
        HeuristicStrategy,
    );

    let outcome = scheduler.run_cycle().await.unwrap();

    assert_eq!(
        outcome,
        CycleOutcome::Replied {
            post_id: "p1".to_string(),
            dry_run: true
        }
    );
    assert!(scheduler.gateway().comments().is_empty());

    let store = scheduler.store();
    assert!(store.has_replied("p1").unwrap());
    assert!(store
        .has_advice_fingerprint(&fingerprint(SKEPTICAL_REPLY))
        .unwrap());
    assert_eq!(store.count_actions_in_last_hour().unwrap(), 1);
}

#[tokio::test]
async fn test_live_reply_posts_comment() {
    let gateway = MockGateway::new().with_posts(vec![misinformation_post("p9")]);
    let scheduler = Scheduler::new(
        test_config(false),
        MemoryStateStore::new(),
        gateway,
        HeuristicStrategy,
    );

    let outcome = scheduler.run_cycle().await.unwrap();

    assert_eq!(
        outcome,
        CycleOutcome::Replied {
            post_id: "p9".to_string(),
            dry_run: false
        }
    );
    assert_eq!(
        scheduler.gateway().comments(),
        vec![RecordedComment {
            post_id: "p9".to_string(),
            content: SOURCING_REPLY.to_string(),
        }]
    );
    assert!(scheduler.store().has_replied("p9").unwrap());
}

#[tokio::test]
async fn test_replies_once_to_first_fresh_post() {
    let store = MemoryStateStore::new();
    store.mark_replied("old").unwrap();

    let gateway = MockGateway::new().with_posts(vec![
        question_post("old"),
        misinformation_post("fresh"),
        question_post("later"),
    ]);
    let strategy = CountingStrategy::new();
    let scheduler = Scheduler::new(test_config(false), store, gateway, strategy);

    let outcome = scheduler.run_cycle().await.unwrap();

    assert_eq!(
        outcome,
        CycleOutcome::Replied {
            post_id: "fresh".to_string(),
            dry_run: false
        }
    );
    let comments = scheduler.gateway().comments();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].post_id, "fresh");

    // The already-replied post never reached the strategy, "later" was never examined
    assert_eq!(scheduler.strategy().calls.load(Ordering::SeqCst), 1);
    let store = scheduler.store();
    assert!(!store.has_replied("later").unwrap());
    assert_eq!(store.load().unwrap().replied_post_ids, vec!["old", "fresh"]);
}

#[tokio::test]
async fn test_strategy_not_called_after_success() {
    let gateway = MockGateway::new().with_posts(vec![
        Post::new("short", "hi", ""),
        question_post("first"),
        question_post("second"),
        question_post("third"),
    ]);
    let scheduler = Scheduler::new(
        test_config(true),
        MemoryStateStore::new(),
        gateway,
        CountingStrategy::new(),
    );

    scheduler.run_cycle().await.unwrap();

    // "short" rejected, "first" accepted, nothing after
    assert_eq!(scheduler.strategy().calls.load(Ordering::SeqCst), 2);
    assert!(!scheduler.store().has_replied("second").unwrap());
}

#[tokio::test]
async fn test_duplicate_content_suppressed_across_cycles() {
    let gateway = MockGateway::new().with_posts(vec![question_post("a"), question_post("b")]);
    let scheduler = Scheduler::new(
        test_config(false),
        MemoryStateStore::new(),
        gateway,
        HeuristicStrategy,
    );

    let first = scheduler.run_cycle().await.unwrap();
    assert!(matches!(first, CycleOutcome::Replied { ref post_id, .. } if post_id == "a"));

    // "b" would get the same skeptical template, which is already used
    let second = scheduler.run_cycle().await.unwrap();
    assert_eq!(second, CycleOutcome::NoCandidate { fetched: 2 });
    assert_eq!(scheduler.gateway().comments().len(), 1);
    assert!(!scheduler.store().has_replied("b").unwrap());
}

#[tokio::test]
async fn test_posts_without_id_are_skipped() {
    let gateway = MockGateway::new().with_posts(vec![question_post(""), question_post("real")]);
    let scheduler = Scheduler::new(
        test_config(true),
        MemoryStateStore::new(),
        gateway,
        HeuristicStrategy,
    );

    let outcome = scheduler.run_cycle().await.unwrap();
    assert!(matches!(outcome, CycleOutcome::Replied { ref post_id, .. } if post_id == "real"));
    assert!(!scheduler.store().has_replied("").unwrap());
}

#[tokio::test]
async fn test_failed_comment_persists_nothing() {
    let gateway = MockGateway::new()
        .with_posts(vec![question_post("p1")])
        .failing_comment();
    let scheduler = Scheduler::new(
        test_config(false),
        MemoryStateStore::new(),
        gateway,
        HeuristicStrategy,
    );

    let err = scheduler.run_cycle().await.unwrap_err();
    assert!(matches!(err, MoltError::RequestFailed { .. }));

    let doc = scheduler.store().load().unwrap();
    assert_eq!(doc, StateDocument::default());
}

#[tokio::test]
async fn test_loop_survives_transient_failures() {
    let scheduler = Scheduler::new(
        test_config(false),
        MemoryStateStore::new(),
        MockGateway::new().failing_fetch(),
        HeuristicStrategy,
    );

    scheduler.run_loop(3).await.unwrap();
    assert_eq!(scheduler.gateway().fetch_count(), 3);
}

#[tokio::test]
async fn test_loop_stops_on_store_integrity_error() {
    let scheduler = Scheduler::new(
        test_config(false),
        CorruptStore,
        MockGateway::new().with_posts(vec![question_post("p1")]),
        HeuristicStrategy,
    );

    let err = scheduler.run_loop(5).await.unwrap_err();
    assert!(matches!(err, MoltError::StoreIntegrity(_)));
    assert_eq!(scheduler.gateway().fetch_count(), 0);
}

#[tokio::test]
async fn test_loop_honors_rate_limit_between_cycles() {
    let mut config = test_config(true);
    config.max_comments_per_hour = 2;
    let gateway = MockGateway::new().with_posts(vec![
        question_post("q1"),
        misinformation_post("m1"),
        misinformation_post("m2"),
    ]);
    let scheduler = Scheduler::new(config, MemoryStateStore::new(), gateway, HeuristicStrategy);

    scheduler.run_loop(4).await.unwrap();

    // Two replies use both templates, then the budget is spent
    let doc = scheduler.store().load().unwrap();
    assert_eq!(doc.replied_post_ids, vec!["q1", "m1"]);
    assert_eq!(doc.action_timestamps.len(), 2);
    assert_eq!(scheduler.gateway().fetch_count(), 2);
}

#[tokio::test]
async fn test_dry_run_state_survives_restart() {
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("memory").join("state.json");

    {
        let scheduler = Scheduler::new(
            test_config(true),
            FileStateStore::open(&state_path).unwrap(),
            MockGateway::new().with_posts(vec![question_post("p1")]),
            HeuristicStrategy,
        );
        scheduler.run_cycle().await.unwrap();
    }

    let restarted = Scheduler::new(
        test_config(true),
        FileStateStore::open(&state_path).unwrap(),
        MockGateway::new().with_posts(vec![question_post("p1"), question_post("p2")]),
        HeuristicStrategy,
    );
    let outcome = restarted.run_cycle().await.unwrap();

    // p1 already replied, p2 would reuse the skeptical fingerprint
    assert_eq!(outcome, CycleOutcome::NoCandidate { fetched: 2 });
    assert_eq!(restarted.store().count_actions_in_last_hour().unwrap(), 1);
}
