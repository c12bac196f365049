use chrono::{DateTime, Duration, Utc};

/// How long a fetch stays fresh.
pub fn cache_ttl() -> Duration {
    Duration::hours(24)
}

/// True when there was never a fetch or the last one is older than the TTL.
pub fn is_stale(last_fetch: Option<DateTime<Utc>>) -> bool {
    is_stale_at(last_fetch, Utc::now())
}

pub fn is_stale_at(last_fetch: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last_fetch {
        None => true,
        Some(fetched_at) => now.signed_duration_since(fetched_at) > cache_ttl(),
    }
}
