/// Post Service Library
///
/// Ephemeral single-slot post lifecycle for the Glimpse app: each user may
/// have at most one active post at a time, posts expire a fixed TTL after
/// creation, and viewers read a recency-ordered feed of unexpired posts.
/// Expiry is derived at read time from immutable timestamps; there is no
/// background sweeper.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `models`: Post and feed data structures
/// - `services`: Lifecycle manager and feed assembler
/// - `db`: `PostStore` contract plus Postgres and in-memory adapters
/// - `clock`: Time source abstraction
/// - `middleware`: Caller identity extraction
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Observability and metrics collection
/// - `timefmt`: Relative-time formatting
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;
pub mod timefmt;

pub use config::Config;
pub use error::{AppError, Result};
