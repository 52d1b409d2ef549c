/// Relative-time formatting shared by feed assembly and post responses.
///
/// Buckets are monotonic: as elapsed time grows the rendered unit never
/// moves backwards, and remaining time renders a terminal "Expired" instead
/// of a negative duration.
use chrono::{DateTime, Duration, Utc};

/// Elapsed time since `from`, bucketed into human units.
pub fn format_time_ago(from: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - from).max(Duration::zero());
    let secs = elapsed.num_seconds();

    if secs < 60 {
        "just now".to_string()
    } else if secs < 3_600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86_400 {
        format!("{}h ago", secs / 3_600)
    } else {
        format!("{}d ago", secs / 86_400)
    }
}

/// Time left until `expires_at`, bucketed; zero renders as "Expired".
pub fn format_time_remaining(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let remaining = (expires_at - now).max(Duration::zero());
    let secs = remaining.num_seconds();

    if secs == 0 {
        "Expired".to_string()
    } else if secs < 60 {
        format!("{}s left", secs)
    } else if secs < 3_600 {
        format!("{}m left", secs / 60)
    } else if secs < 86_400 {
        format!("{}h left", secs / 3_600)
    } else {
        format!("{}d left", secs / 86_400)
    }
}
