/// Post handlers - HTTP endpoints for the single-slot post lifecycle
use crate::error::Result;
use crate::handlers::AppState;
use crate::metrics;
use crate::middleware::UserId;
use crate::models::Post;
use crate::timefmt;
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    /// Reference to media already persisted by the media collaborator.
    pub image_key: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    #[serde(flatten)]
    pub post: Post,
    pub seconds_remaining: i64,
    pub time_remaining: String,
}

impl PostResponse {
    fn at(post: Post, now: DateTime<Utc>) -> Self {
        Self {
            seconds_remaining: post.remaining_ttl(now).num_seconds(),
            time_remaining: timefmt::format_time_remaining(post.expires_at, now),
            post,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    /// True when this submit retired a previously active post.
    pub replaced: bool,
}

/// Create the caller's post, replacing any currently active one
pub async fn create_post(
    state: web::Data<AppState>,
    user_id: UserId,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    let outcome = state
        .lifecycle
        .submit(user_id.0, &req.image_key, req.description.as_deref())
        .await?;
    metrics::record_submit(outcome.replaced);

    Ok(HttpResponse::Created().json(SubmitResponse {
        post: PostResponse::at(outcome.post, state.lifecycle.now()),
        replaced: outcome.replaced,
    }))
}

/// Get a post by ID
///
/// Superseded and expired rows stay fetchable here; only activity and feed
/// queries exclude them.
pub async fn get_post(
    state: web::Data<AppState>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match state.lifecycle.post_by_id(*post_id).await? {
        Some(post) => Ok(HttpResponse::Ok().json(PostResponse::at(post, state.lifecycle.now()))),
        None => Ok(HttpResponse::NotFound().finish()),
    }
}

/// Get the caller's currently active post
pub async fn get_active_post(
    state: web::Data<AppState>,
    user_id: UserId,
) -> Result<HttpResponse> {
    match state.lifecycle.active_post(user_id.0).await? {
        Some(post) => Ok(HttpResponse::Ok().json(PostResponse::at(post, state.lifecycle.now()))),
        None => Ok(HttpResponse::NotFound().finish()),
    }
}
