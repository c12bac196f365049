mod commands;

pub use commands::{Cli, Commands};

use crate::domain::merge::parse_date;
use crate::domain::Announcement;

/// Human date for listings, or the raw value when it does not parse.
pub fn format_date(raw: &str) -> String {
    parse_date(raw)
        .map(|d| d.format("%b %d, %Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}

pub fn format_announcement(announcement: &Announcement) -> String {
    let mut out = format!(
        "{} [{}] {}",
        format_date(&announcement.date),
        announcement.source,
        announcement.title
    );

    if !announcement.tags.is_empty() {
        out.push_str(&format!(" ({})", announcement.tags.join(", ")));
    }
    if !announcement.description.is_empty() {
        out.push_str(&format!("\n    {}", announcement.description));
    }
    if let Some(link) = &announcement.link {
        out.push_str(&format!("\n    {}", link));
    }

    out
}
