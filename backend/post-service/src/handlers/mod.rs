/// HTTP request handlers
pub mod feed;
pub mod posts;

pub use feed::*;
pub use posts::*;

use crate::services::{FeedAssembler, PostLifecycle};
use std::sync::Arc;

/// Shared handler state: the lifecycle manager and feed assembler over one
/// store and one clock.
pub struct AppState {
    pub lifecycle: Arc<PostLifecycle>,
    pub feed: Arc<FeedAssembler>,
}
