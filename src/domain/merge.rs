use std::cmp::Reverse;
use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use super::Announcement;

/// Parse an announcement date for ordering.
///
/// Accepts RFC 3339, RFC 2822 and bare `YYYY-MM-DD` dates. Anything else is
/// treated as undated.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Keep the first announcement for each identity key, in input order.
pub fn deduplicate<I>(announcements: I) -> Vec<Announcement>
where
    I: IntoIterator<Item = Announcement>,
{
    let mut seen = HashSet::new();
    announcements
        .into_iter()
        .filter(|a| seen.insert(a.identity_key().to_string()))
        .collect()
}

/// Newest first. Undated records go last and keep their relative order.
pub fn sort_newest_first(announcements: &mut [Announcement]) {
    announcements.sort_by_cached_key(|a| Reverse(parse_date(&a.date)));
}

/// Combine `existing` and `incoming`, drop duplicates (first occurrence wins)
/// and order the result newest first. Inputs are left untouched.
pub fn merge_announcements(existing: &[Announcement], incoming: &[Announcement]) -> Vec<Announcement> {
    let mut merged = deduplicate(existing.iter().chain(incoming).cloned());
    sort_newest_first(&mut merged);
    merged
}
