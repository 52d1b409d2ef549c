//! Lifecycle manager tests: single-active invariant, replace semantics,
//! derived expiry, validation, and submit serialization under concurrency.

mod common;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use common::{harness, start_time, TTL_HOURS};
use post_service::clock::ManualClock;
use post_service::db::{FeedCursor, MemoryPostStore, PostStore};
use post_service::error::AppError;
use post_service::models::Post;
use post_service::services::PostLifecycle;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Store wrapper whose writes can be flipped to fail, for exercising the
/// durable-write failure path.
struct FlakyPostStore {
    inner: MemoryPostStore,
    fail_writes: AtomicBool,
}

impl FlakyPostStore {
    fn new() -> Self {
        Self {
            inner: MemoryPostStore::new(),
            fail_writes: AtomicBool::new(false),
        }
    }

    fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl PostStore for FlakyPostStore {
    async fn insert_post(
        &self,
        user_id: Uuid,
        image_key: &str,
        description: Option<&str>,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> post_service::Result<Post> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::TransientStore(
                "connection reset by peer".to_string(),
            ));
        }
        self.inner
            .insert_post(user_id, image_key, description, created_at, expires_at)
            .await
    }

    async fn latest_unexpired_for_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> post_service::Result<Option<Post>> {
        self.inner.latest_unexpired_for_user(user_id, now).await
    }

    async fn find_post_by_id(&self, post_id: Uuid) -> post_service::Result<Option<Post>> {
        self.inner.find_post_by_id(post_id).await
    }

    async fn list_unexpired(
        &self,
        now: DateTime<Utc>,
        limit: i64,
        before: Option<FeedCursor>,
    ) -> post_service::Result<Vec<Post>> {
        self.inner.list_unexpired(now, limit, before).await
    }
}

fn flaky_lifecycle() -> (Arc<FlakyPostStore>, PostLifecycle) {
    let store = Arc::new(FlakyPostStore::new());
    let clock = Arc::new(ManualClock::new(start_time()));
    let lifecycle = PostLifecycle::new(store.clone(), clock, Duration::hours(TTL_HOURS));
    (store, lifecycle)
}

#[tokio::test]
async fn submit_creates_active_post_with_full_ttl() {
    let h = harness();
    let owner = Uuid::new_v4();

    let outcome = h
        .lifecycle
        .submit(owner, "media/a", Some("first light"))
        .await
        .unwrap();

    assert!(!outcome.replaced);
    assert_eq!(outcome.post.user_id, owner);
    assert_eq!(
        outcome.post.expires_at - outcome.post.created_at,
        Duration::hours(TTL_HOURS)
    );
    assert_eq!(
        h.lifecycle.remaining_ttl(&outcome.post),
        Duration::hours(TTL_HOURS)
    );

    let active = h.lifecycle.active_post(owner).await.unwrap();
    assert_eq!(active.unwrap().id, outcome.post.id);
}

#[tokio::test]
async fn replace_creates_new_identity_and_retires_old() {
    let h = harness();
    let owner = Uuid::new_v4();

    let first = h.lifecycle.submit(owner, "media/a", None).await.unwrap();
    h.clock.advance(Duration::hours(1));
    let second = h.lifecycle.submit(owner, "media/b", None).await.unwrap();

    assert!(second.replaced);
    assert_ne!(first.post.id, second.post.id);

    // The old row is retained, just excluded from activity queries.
    assert_eq!(h.store.post_count().await, 2);
    let fetched = h.lifecycle.post_by_id(first.post.id).await.unwrap();
    assert!(fetched.is_some());

    let active = h.lifecycle.active_post(owner).await.unwrap().unwrap();
    assert_eq!(active.id, second.post.id);
}

#[tokio::test]
async fn expiry_is_derived_without_any_write() {
    let h = harness();
    let owner = Uuid::new_v4();

    let outcome = h.lifecycle.submit(owner, "media/a", None).await.unwrap();

    // One second before expiry the post is still active.
    h.clock
        .advance(Duration::hours(TTL_HOURS) - Duration::seconds(1));
    assert!(h.lifecycle.active_post(owner).await.unwrap().is_some());

    // At exactly expires_at activity ends; no row was mutated.
    h.clock.advance(Duration::seconds(1));
    assert!(h.lifecycle.active_post(owner).await.unwrap().is_none());
    assert_eq!(
        h.lifecycle.remaining_ttl(&outcome.post),
        Duration::zero()
    );
    assert_eq!(h.store.post_count().await, 1);
}

#[tokio::test]
async fn remaining_ttl_is_non_increasing() {
    let h = harness();
    let owner = Uuid::new_v4();
    let post = h.lifecycle.submit(owner, "media/a", None).await.unwrap().post;

    let mut previous = h.lifecycle.remaining_ttl(&post);
    for _ in 0..30 {
        h.clock.advance(Duration::hours(1));
        let current = h.lifecycle.remaining_ttl(&post);
        assert!(current <= previous);
        assert!(current >= Duration::zero());
        previous = current;
    }
    assert_eq!(previous, Duration::zero());
}

#[tokio::test]
async fn worked_scenario_create_replace_expire() {
    let h = harness();
    let owner = Uuid::new_v4();

    // t=0: owner submits A.
    let a = h.lifecycle.submit(owner, "media/a", None).await.unwrap().post;
    assert_eq!(h.lifecycle.active_post(owner).await.unwrap().unwrap().id, a.id);
    assert_eq!(h.lifecycle.remaining_ttl(&a), Duration::hours(24));

    // t=1h: owner submits B; A stays in storage but leaves the feed.
    h.clock.advance(Duration::hours(1));
    let b = h.lifecycle.submit(owner, "media/b", None).await.unwrap().post;
    assert_eq!(h.lifecycle.active_post(owner).await.unwrap().unwrap().id, b.id);
    assert_eq!(h.store.post_count().await, 2);

    let page = h.feed.list_active(20, None).await.unwrap();
    assert_eq!(page.posts.len(), 1);
    assert_eq!(page.posts[0].post.id, b.id);

    // t=25h: both have lapsed.
    h.clock.advance(Duration::hours(24));
    assert!(h.lifecycle.active_post(owner).await.unwrap().is_none());
    assert_eq!(h.lifecycle.remaining_ttl(&b), Duration::zero());
    assert!(h.feed.list_active(20, None).await.unwrap().posts.is_empty());
}

#[tokio::test]
async fn concurrent_submits_serialize_per_owner() {
    let h = harness();
    let owner = Uuid::new_v4();

    let mut handles = Vec::new();
    for i in 0..16 {
        let lifecycle = h.lifecycle.clone();
        handles.push(tokio::spawn(async move {
            lifecycle
                .submit(owner, &format!("media/{i}"), None)
                .await
                .unwrap()
        }));
    }
    let mut max_seq = 0;
    for handle in handles {
        let outcome = handle.await.unwrap();
        max_seq = max_seq.max(outcome.post.seq_id);
    }

    // Every submit landed, and exactly one post is active: the one inserted
    // last (identical timestamps, seq_id breaks the tie).
    assert_eq!(h.store.post_count().await, 16);
    let active = h.lifecycle.active_post(owner).await.unwrap().unwrap();
    assert_eq!(active.seq_id, max_seq);

    let page = h.feed.list_active(50, None).await.unwrap();
    assert_eq!(page.posts.len(), 1);
    assert_eq!(page.posts[0].post.seq_id, max_seq);
}

#[tokio::test]
async fn submits_for_distinct_owners_are_independent() {
    let h = harness();
    let owners: Vec<Uuid> = (0..8).map(|_| Uuid::new_v4()).collect();

    let mut handles = Vec::new();
    for owner in &owners {
        let lifecycle = h.lifecycle.clone();
        let owner = *owner;
        handles.push(tokio::spawn(async move {
            lifecycle.submit(owner, "media/x", None).await.unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for owner in &owners {
        assert!(h.lifecycle.active_post(*owner).await.unwrap().is_some());
    }
}

#[tokio::test]
async fn failed_write_surfaces_as_transient_store() {
    let (store, lifecycle) = flaky_lifecycle();
    let owner = Uuid::new_v4();

    store.set_fail_writes(true);
    let err = lifecycle.submit(owner, "media/a", None).await.unwrap_err();
    assert!(matches!(err, AppError::TransientStore(_)));

    // The write did not happen: no row, no active post.
    assert!(lifecycle.active_post(owner).await.unwrap().is_none());
    assert_eq!(store.inner.post_count().await, 0);

    // A retry once the fault clears succeeds from a clean slate.
    store.set_fail_writes(false);
    let outcome = lifecycle.submit(owner, "media/a", None).await.unwrap();
    assert!(!outcome.replaced);
    assert_eq!(store.inner.post_count().await, 1);
}

#[tokio::test]
async fn failed_replace_leaves_previous_post_active() {
    let (store, lifecycle) = flaky_lifecycle();
    let owner = Uuid::new_v4();

    let first = lifecycle.submit(owner, "media/a", None).await.unwrap().post;

    store.set_fail_writes(true);
    let err = lifecycle.submit(owner, "media/b", None).await.unwrap_err();
    assert!(matches!(err, AppError::TransientStore(_)));

    // The failed replace applied nothing; the original post still holds the
    // slot.
    let active = lifecycle.active_post(owner).await.unwrap().unwrap();
    assert_eq!(active.id, first.id);
    assert_eq!(store.inner.post_count().await, 1);
}

#[tokio::test]
async fn rejects_empty_image_key() {
    let h = harness();
    let err = h
        .lifecycle
        .submit(Uuid::new_v4(), "  ", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(h.store.post_count().await, 0);
}

#[tokio::test]
async fn rejects_overlong_description() {
    let h = harness();
    let owner = Uuid::new_v4();

    // 500 code points is the limit; multi-byte characters count once.
    let at_limit: String = "é".repeat(500);
    assert!(h
        .lifecycle
        .submit(owner, "media/a", Some(&at_limit))
        .await
        .is_ok());

    let over_limit: String = "é".repeat(501);
    let err = h
        .lifecycle
        .submit(owner, "media/b", Some(&over_limit))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}
