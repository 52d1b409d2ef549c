/// Feed handler - paginated read view of currently-unexpired posts
use crate::error::Result;
use crate::handlers::AppState;
use crate::metrics;
use crate::middleware::UserId;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct FeedQueryParams {
    #[serde(default = "default_limit")]
    pub limit: usize,
    pub cursor: Option<String>,
}

fn default_limit() -> usize {
    20
}

pub async fn get_feed(
    state: web::Data<AppState>,
    user_id: UserId,
    query: web::Query<FeedQueryParams>,
) -> Result<HttpResponse> {
    debug!(
        user_id = %user_id.0,
        limit = query.limit,
        has_cursor = query.cursor.is_some(),
        "feed request"
    );

    let page = state
        .feed
        .list_active(query.limit, query.cursor.as_deref())
        .await?;
    metrics::record_feed_request();

    Ok(HttpResponse::Ok().json(page))
}
