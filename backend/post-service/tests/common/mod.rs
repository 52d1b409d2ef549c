//! Shared test harness: lifecycle manager and feed assembler wired to the
//! in-memory store and a manual clock, so expiry can be exercised without
//! sleeping.
#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use post_service::clock::ManualClock;
use post_service::db::MemoryPostStore;
use post_service::services::{FeedAssembler, PostLifecycle};
use std::sync::Arc;

pub const TTL_HOURS: i64 = 24;

pub struct TestHarness {
    pub store: Arc<MemoryPostStore>,
    pub clock: Arc<ManualClock>,
    pub lifecycle: Arc<PostLifecycle>,
    pub feed: Arc<FeedAssembler>,
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
}

pub fn harness() -> TestHarness {
    let store = Arc::new(MemoryPostStore::new());
    let clock = Arc::new(ManualClock::new(start_time()));
    let lifecycle = Arc::new(PostLifecycle::new(
        store.clone(),
        clock.clone(),
        Duration::hours(TTL_HOURS),
    ));
    let feed = Arc::new(FeedAssembler::new(store.clone(), clock.clone()));
    TestHarness {
        store,
        clock,
        lifecycle,
        feed,
    }
}
