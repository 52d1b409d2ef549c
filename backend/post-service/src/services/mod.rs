/// Business logic layer
pub mod feed;
pub mod lifecycle;

pub use feed::FeedAssembler;
pub use lifecycle::{PostLifecycle, SubmitOutcome};
