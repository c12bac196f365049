use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::merge::merge_announcements;
use super::staleness::is_stale_at;
use super::Announcement;

/// Fetch metadata kept for each source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMeta {
    pub last_fetch: DateTime<Utc>,
    pub count: usize,
}

/// The persisted cache: every announcement plus fetch bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheDocument {
    #[serde(default)]
    pub last_fetch: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sources: BTreeMap<String, SourceMeta>,
    #[serde(default)]
    pub announcements: Vec<Announcement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub last_fetch: Option<DateTime<Utc>>,
    pub is_stale: bool,
    pub total_announcements: usize,
    pub sources: BTreeMap<String, SourceMeta>,
}

impl CacheDocument {
    /// Replace everything `source_key` contributed with `incoming`.
    ///
    /// Announcements of other sources are kept and merged with the new ones,
    /// the source metadata is overwritten and the global fetch time moves to
    /// `now`. Returns the merged announcement list.
    pub fn replace_source(
        &mut self,
        source_key: &str,
        incoming: &[Announcement],
        now: DateTime<Utc>,
    ) -> Vec<Announcement> {
        let others: Vec<Announcement> = self
            .announcements
            .iter()
            .filter(|a| a.source != source_key)
            .cloned()
            .collect();

        let merged = merge_announcements(&others, incoming);

        self.sources.insert(
            source_key.to_string(),
            SourceMeta {
                last_fetch: now,
                count: incoming.len(),
            },
        );
        self.announcements = merged.clone();
        self.last_fetch = Some(now);

        merged
    }

    pub fn by_source(&self, source_key: &str) -> Vec<Announcement> {
        self.announcements
            .iter()
            .filter(|a| a.source == source_key)
            .cloned()
            .collect()
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> CacheStatus {
        CacheStatus {
            last_fetch: self.last_fetch,
            is_stale: is_stale_at(self.last_fetch, now),
            total_announcements: self.announcements.len(),
            sources: self.sources.clone(),
        }
    }
}
