/// Database access layer: the `PostStore` contract plus its adapters.
///
/// `PgPostStore` is the production Postgres adapter; `MemoryPostStore`
/// implements the same visible semantics in memory and backs the test
/// suites.
pub mod memory;
pub mod post_repo;

pub use memory::MemoryPostStore;
pub use post_repo::PgPostStore;

use crate::error::Result;
use crate::models::Post;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Position within the feed ordering `(created_at DESC, seq_id DESC)`.
/// Cursoring on the pair keeps pages stable when new posts land between
/// requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedCursor {
    pub created_at: DateTime<Utc>,
    pub seq_id: i64,
}

/// Durable keyed storage of posts.
///
/// Rows are append-only; nothing in this trait mutates an existing post.
/// Expiry filtering takes `now` as an explicit argument so that the caller's
/// clock is the only time reference (the store itself never consults one).
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Insert a new post row. The store assigns `id` and a strictly
    /// increasing `seq_id`. Exactly one durable write.
    async fn insert_post(
        &self,
        user_id: Uuid,
        image_key: &str,
        description: Option<&str>,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<Post>;

    /// Newest row for `user_id` with `expires_at > now`, or `None`.
    /// Ties on `created_at` fall back to `seq_id`.
    async fn latest_unexpired_for_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>>;

    /// Direct id lookup. Superseded and expired rows stay fetchable here.
    async fn find_post_by_id(&self, post_id: Uuid) -> Result<Option<Post>>;

    /// Newest-first page of unexpired posts, at most one row per owner (the
    /// newest), strictly before `before` when given.
    async fn list_unexpired(
        &self,
        now: DateTime<Utc>,
        limit: i64,
        before: Option<FeedCursor>,
    ) -> Result<Vec<Post>>;
}
