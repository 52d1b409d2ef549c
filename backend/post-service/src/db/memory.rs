/// In-memory `PostStore` adapter.
///
/// Mirrors the Postgres adapter's visible semantics (append-only rows,
/// assigned ids and sequence numbers, newest-unexpired-per-owner feed
/// pages). Used by the test suites and for running the service without a
/// database.
use crate::db::{FeedCursor, PostStore};
use crate::error::Result;
use crate::models::Post;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashSet;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct MemoryInner {
    posts: Vec<Post>,
    next_seq: i64,
}

#[derive(Default)]
pub struct MemoryPostStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total rows retained, including expired and superseded ones.
    pub async fn post_count(&self) -> usize {
        self.inner.lock().await.posts.len()
    }
}

/// Feed ordering: descending `(created_at, seq_id)`.
fn feed_key(post: &Post) -> (DateTime<Utc>, i64) {
    (post.created_at, post.seq_id)
}

/// `timestamptz` keeps microseconds, and the feed cursor encodes
/// microseconds; storing anything finer would let a sub-microsecond
/// neighbour of a page-boundary row slip past the cursor comparison.
fn to_storage_precision(t: DateTime<Utc>) -> DateTime<Utc> {
    Utc.timestamp_micros(t.timestamp_micros())
        .single()
        .unwrap_or(t)
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn insert_post(
        &self,
        user_id: Uuid,
        image_key: &str,
        description: Option<&str>,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<Post> {
        let mut inner = self.inner.lock().await;
        inner.next_seq += 1;
        let post = Post {
            id: Uuid::new_v4(),
            user_id,
            image_key: image_key.to_string(),
            description: description.map(str::to_string),
            seq_id: inner.next_seq,
            created_at: to_storage_precision(created_at),
            expires_at: to_storage_precision(expires_at),
        };
        inner.posts.push(post.clone());
        Ok(post)
    }

    async fn latest_unexpired_for_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .posts
            .iter()
            .filter(|p| p.user_id == user_id && p.expires_at > now)
            .max_by_key(|p| feed_key(p))
            .cloned())
    }

    async fn find_post_by_id(&self, post_id: Uuid) -> Result<Option<Post>> {
        let inner = self.inner.lock().await;
        Ok(inner.posts.iter().find(|p| p.id == post_id).cloned())
    }

    async fn list_unexpired(
        &self,
        now: DateTime<Utc>,
        limit: i64,
        before: Option<FeedCursor>,
    ) -> Result<Vec<Post>> {
        let inner = self.inner.lock().await;

        let mut unexpired: Vec<&Post> = inner
            .posts
            .iter()
            .filter(|p| p.expires_at > now)
            .collect();
        unexpired.sort_by_key(|p| std::cmp::Reverse(feed_key(p)));

        // Newest-first walk: the first row seen per owner is its newest.
        let mut seen_owners = HashSet::new();
        let page = unexpired
            .into_iter()
            .filter(|p| seen_owners.insert(p.user_id))
            .filter(|p| match before {
                Some(cursor) => feed_key(p) < (cursor.created_at, cursor.seq_id),
                None => true,
            })
            .take(limit.max(0) as usize)
            .cloned()
            .collect();

        Ok(page)
    }
}
