/// Data models for post-service
///
/// A `Post` row is immutable once inserted: replacement inserts a new row
/// with a fresh identity and the superseded row simply ages out. There is no
/// stored `active` flag; activity is derived from `expires_at` and the
/// current time.
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Upper bound on description length, in Unicode code points.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_key: String,
    pub description: Option<String>,
    /// Insertion-order tie-breaker; strictly increasing across all posts.
    pub seq_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Post {
    /// Activity predicate: strictly before `expires_at`. No write is ever
    /// needed to deactivate a post.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Remaining lifetime at `now`, clamped at zero.
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).max(Duration::zero())
    }
}

/// One feed card: the post plus display values computed at assembly time.
#[derive(Debug, Serialize)]
pub struct FeedEntry {
    #[serde(flatten)]
    pub post: Post,
    pub seconds_remaining: i64,
    pub time_ago: String,
    pub time_remaining: String,
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub posts: Vec<FeedEntry>,
    pub cursor: Option<String>,
    pub has_more: bool,
}
