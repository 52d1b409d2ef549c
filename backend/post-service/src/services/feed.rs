/// Feed assembler - the ordered, expiry-filtered read view.
///
/// Pure read path: takes no locks, mutates nothing, and relies solely on the
/// activity predicate (expires_at > now) evaluated against stored immutable
/// timestamps. Display values are computed at response assembly time so two
/// requests seconds apart return different remaining times without any
/// background job.
use crate::clock::Clock;
use crate::db::{FeedCursor, PostStore};
use crate::error::{AppError, Result};
use crate::models::{FeedEntry, FeedResponse};
use crate::timefmt;
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

const MIN_LIMIT: usize = 1;
const MAX_LIMIT: usize = 100;

pub struct FeedAssembler {
    store: Arc<dyn PostStore>,
    clock: Arc<dyn Clock>,
}

impl FeedAssembler {
    pub fn new(store: Arc<dyn PostStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// One page of currently-unexpired posts, newest first, at most one per
    /// owner. `cursor` is an opaque token from a previous page.
    pub async fn list_active(&self, limit: usize, cursor: Option<&str>) -> Result<FeedResponse> {
        let limit = limit.clamp(MIN_LIMIT, MAX_LIMIT);
        let before = cursor.map(decode_cursor).transpose()?;
        let now = self.clock.now();

        // Fetch one extra row to learn whether another page exists.
        let mut posts = self
            .store
            .list_unexpired(now, (limit + 1) as i64, before)
            .await?;
        let has_more = posts.len() > limit;
        posts.truncate(limit);

        let next_cursor = if has_more {
            posts.last().map(|p| {
                encode_cursor(FeedCursor {
                    created_at: p.created_at,
                    seq_id: p.seq_id,
                })
            })
        } else {
            None
        };

        let entries = posts
            .into_iter()
            .map(|post| FeedEntry {
                seconds_remaining: post.remaining_ttl(now).num_seconds(),
                time_ago: timefmt::format_time_ago(post.created_at, now),
                time_remaining: timefmt::format_time_remaining(post.expires_at, now),
                post,
            })
            .collect();

        Ok(FeedResponse {
            posts: entries,
            cursor: next_cursor,
            has_more,
        })
    }
}

/// Cursor wire format: base64 of "<created_at_micros>:<seq_id>".
pub(crate) fn encode_cursor(cursor: FeedCursor) -> String {
    let raw = format!(
        "{}:{}",
        cursor.created_at.timestamp_micros(),
        cursor.seq_id
    );
    general_purpose::STANDARD.encode(raw)
}

pub(crate) fn decode_cursor(cursor: &str) -> Result<FeedCursor> {
    let invalid = || AppError::Validation("invalid cursor".to_string());

    let decoded = general_purpose::STANDARD
        .decode(cursor)
        .map_err(|_| invalid())?;
    let raw = String::from_utf8(decoded).map_err(|_| invalid())?;

    let (micros_str, seq_str) = raw.split_once(':').ok_or_else(invalid)?;
    let micros: i64 = micros_str.parse().map_err(|_| invalid())?;
    let seq_id: i64 = seq_str.parse().map_err(|_| invalid())?;

    let created_at: DateTime<Utc> = Utc
        .timestamp_micros(micros)
        .single()
        .ok_or_else(invalid)?;

    Ok(FeedCursor { created_at, seq_id })
}
