use std::iter;

use feed_rs::model::Entry;
use feed_rs::parser;
use regex::Regex;
use reqwest::blocking::Client;
use serde_json::json;
use tracing::{debug, error};

use crate::config::RssFeedConfig;
use crate::domain::announcement::{truncate_chars, DEFAULT_CATEGORY, DEFAULT_TITLE, DESCRIPTION_LIMIT};
use crate::domain::{Announcement, FeedType};
use crate::errors::{TrackerError, TrackerResult};
use crate::sources::client::DEFAULT_LIMIT;
use crate::sources::fields::RawItem;
use crate::sources::normalizer::{Field, FieldMapping};
use crate::sources::traits::FeedFetcher;

const ENTRY_PATTERN: &str = r"(?s)<(?:item|entry)\b.*?</(?:item|entry)>";
const DATE_PATTERN: &str =
    r"(?s)<(?:pubDate|published|updated|dc:date)>\s*(?:<!\[CDATA\[)?(.*?)(?:\]\]>)?\s*</";

/// RSS, Atom and JSON Feed documents.
pub struct SyndicationFetcher {
    client: Client,
    source_key: String,
    url: String,
    limit: usize,
    category: String,
    mapping: FieldMapping,
}

impl SyndicationFetcher {
    pub fn new(client: Client, source_key: &str, config: &RssFeedConfig) -> Self {
        Self {
            client,
            source_key: source_key.to_string(),
            url: config.url.clone(),
            limit: config.limit.unwrap_or(DEFAULT_LIMIT),
            category: config
                .category
                .clone()
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            mapping: FieldMapping::syndication().with_overrides(&config.fields),
        }
    }

    fn fetch_raw(&self) -> TrackerResult<Vec<RawItem>> {
        let response = self.client.get(&self.url).send()?.error_for_status()?;
        let bytes = response.bytes()?;

        Self::parse_bytes(&bytes, self.limit)
    }

    /// Parse a feed document into raw items, keeping at most `limit` entries.
    pub fn parse_bytes(bytes: &[u8], limit: usize) -> TrackerResult<Vec<RawItem>> {
        let parsed = parser::parse(bytes).map_err(|e| TrackerError::FeedParse(e.to_string()))?;

        let mut dates = raw_dates(bytes)?;
        if dates.len() != parsed.entries.len() {
            dates.clear();
        }

        Ok(parsed
            .entries
            .into_iter()
            .zip(dates.into_iter().chain(iter::repeat(None)))
            .take(limit)
            .map(|(entry, raw_date)| entry_to_raw(entry, raw_date))
            .collect())
    }

    pub fn normalize(&self, item: &RawItem) -> Announcement {
        let title = self
            .mapping
            .text(item, Field::Title)
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        let content = self.mapping.text(item, Field::Content);
        let description = self
            .mapping
            .text(item, Field::Description)
            .or_else(|| content.as_deref().map(|c| truncate_chars(c, DESCRIPTION_LIMIT)));

        Announcement::new(self.source_key.as_str(), title)
            .with_date(self.mapping.text(item, Field::Date).unwrap_or_default())
            .with_description(description.unwrap_or_default())
            .with_content(content.unwrap_or_default())
            .with_link(self.mapping.text(item, Field::Link))
            .with_category(
                self.mapping
                    .text(item, Field::Category)
                    .unwrap_or_else(|| self.category.clone()),
            )
            .with_tags(self.mapping.tags(item))
    }
}

impl FeedFetcher for SyndicationFetcher {
    fn feed_type(&self) -> FeedType {
        FeedType::Rss
    }

    fn fetch(&self) -> Vec<Announcement> {
        match self.fetch_raw() {
            Ok(items) => {
                debug!(source = %self.source_key, url = %self.url, count = items.len(), "Fetched feed");
                items.iter().map(|item| self.normalize(item)).collect()
            }
            Err(e) => {
                error!(source = %self.source_key, url = %self.url, error = %e, "Error fetching RSS feed");
                Vec::new()
            }
        }
    }
}

/// Date text of every item or entry as written in the document, in order.
fn raw_dates(bytes: &[u8]) -> TrackerResult<Vec<Option<String>>> {
    let entry = Regex::new(ENTRY_PATTERN).map_err(|e| TrackerError::FeedParse(e.to_string()))?;
    let date = Regex::new(DATE_PATTERN).map_err(|e| TrackerError::FeedParse(e.to_string()))?;
    let text = String::from_utf8_lossy(bytes);

    Ok(entry
        .find_iter(&text)
        .map(|m| {
            date.captures(m.as_str())
                .and_then(|c| c.get(1))
                .map(|d| d.as_str().trim().to_string())
                .filter(|d| !d.is_empty())
        })
        .collect())
}

/// Project a parsed entry onto the field names feed mappings refer to.
///
/// A date feed-rs could not parse is kept verbatim in `pubDate`.
fn entry_to_raw(entry: Entry, raw_date: Option<String>) -> RawItem {
    let iso_date = entry.published.or(entry.updated).map(|dt| dt.to_rfc3339());
    let published = match entry.published {
        Some(dt) => Some(dt.to_rfc3339()),
        None if iso_date.is_none() => raw_date.clone(),
        None => None,
    };
    let updated = entry.updated.map(|dt| dt.to_rfc3339());
    let link = entry.links.first().map(|l| l.href.clone());
    let summary = entry.summary.map(|s| s.content);
    let content = entry.content.and_then(|c| c.body);
    let categories: Vec<String> = entry.categories.into_iter().map(|c| c.term).collect();
    let author = entry.authors.first().map(|p| p.name.clone());

    json!({
        "id": entry.id,
        "title": entry.title.map(|t| t.content),
        "link": link,
        "pubDate": published,
        "isoDate": iso_date,
        "updated": updated,
        "rawDate": raw_date,
        "summary": summary.clone(),
        "description": summary,
        "content": content,
        "categories": categories,
        "author": author,
    })
}
