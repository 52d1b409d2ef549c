/// Post lifecycle manager - the single-slot invariant owner.
///
/// Enforces "at most one active post per owner". All create/replace
/// decisions go through `submit`, which serializes the
/// determine-active-then-insert sequence per owner; without that, two
/// concurrent submits could both observe "no active post" and both insert.
/// Reads (`active_post`, `remaining_ttl`) never take the lock: activity is a
/// pure function of stored immutable timestamps and the clock, so they agree
/// with whatever `submit` would decide at the same instant.
use crate::clock::Clock;
use crate::db::PostStore;
use crate::error::{AppError, Result};
use crate::models::{Post, MAX_DESCRIPTION_CHARS};
use chrono::Duration;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Result of a `submit` call. `replaced` is true when an active post existed
/// for the owner at decision time and was retired from activity queries by
/// the new row.
#[derive(Debug)]
pub struct SubmitOutcome {
    pub post: Post,
    pub replaced: bool,
}

pub struct PostLifecycle {
    store: Arc<dyn PostStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    /// Arena-style keyed locks: one per owner, created on demand and removed
    /// once uncontended.
    submit_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl PostLifecycle {
    pub fn new(store: Arc<dyn PostStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            store,
            clock,
            ttl,
            submit_locks: DashMap::new(),
        }
    }

    /// Create the owner's post, replacing any currently active one.
    ///
    /// The new row gets `created_at = now`, `expires_at = now + ttl` with
    /// `now` read exactly once inside the critical section. A superseded row
    /// is left untouched in storage; it simply stops being the owner's
    /// newest unexpired row.
    pub async fn submit(
        &self,
        user_id: Uuid,
        image_key: &str,
        description: Option<&str>,
    ) -> Result<SubmitOutcome> {
        if image_key.trim().is_empty() {
            return Err(AppError::Validation("image_key must not be empty".into()));
        }
        if let Some(text) = description {
            let chars = text.chars().count();
            if chars > MAX_DESCRIPTION_CHARS {
                return Err(AppError::Validation(format!(
                    "description is {} code points, maximum is {}",
                    chars, MAX_DESCRIPTION_CHARS
                )));
            }
        }

        let outcome = {
            let lock = self.owner_lock(user_id);
            let _guard = lock.lock().await;

            let now = self.clock.now();
            let previous = self.store.latest_unexpired_for_user(user_id, now).await?;
            let post = self
                .store
                .insert_post(user_id, image_key, description, now, now + self.ttl)
                .await?;

            SubmitOutcome {
                post,
                replaced: previous.is_some(),
            }
        };
        self.release_owner_lock(user_id);

        tracing::info!(
            user_id = %user_id,
            post_id = %outcome.post.id,
            replaced = outcome.replaced,
            expires_at = %outcome.post.expires_at,
            "post submitted"
        );

        Ok(outcome)
    }

    /// The owner's currently active post, or `None`. Lock-free pure read.
    pub async fn active_post(&self, user_id: Uuid) -> Result<Option<Post>> {
        let now = self.clock.now();
        self.store.latest_unexpired_for_user(user_id, now).await
    }

    /// Direct id lookup; superseded and expired posts remain fetchable.
    pub async fn post_by_id(&self, post_id: Uuid) -> Result<Option<Post>> {
        self.store.find_post_by_id(post_id).await
    }

    /// Current time as the lifecycle's clock sees it.
    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    /// `max(0, expires_at - now)`; zero means expired regardless of what the
    /// store still holds.
    pub fn remaining_ttl(&self, post: &Post) -> Duration {
        post.remaining_ttl(self.clock.now())
    }

    fn owner_lock(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        self.submit_locks.entry(user_id).or_default().clone()
    }

    fn release_owner_lock(&self, user_id: Uuid) {
        // Only drop the entry while the map holds the sole reference; the
        // shard lock taken by remove_if keeps a concurrent owner_lock from
        // cloning it mid-removal.
        self.submit_locks
            .remove_if(&user_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
