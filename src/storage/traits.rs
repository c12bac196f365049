use chrono::Utc;

use crate::domain::{is_stale, Announcement, CacheDocument, CacheStatus};
use crate::errors::TrackerResult;

/// Persistence for the announcement cache.
///
/// Implementors provide `load` and `save`; everything else is a
/// read-modify-write on top of them. There is no locking: a store must only
/// ever have one writer at a time.
#[cfg_attr(test, mockall::automock)]
pub trait CacheStore: Send + Sync {
    /// Never fails. A missing or unreadable document is replaced by an empty one.
    fn load(&self) -> CacheDocument;

    fn save(&self, document: &CacheDocument) -> TrackerResult<()>;

    /// Replace everything `source_key` contributed and persist the result.
    fn update_source(
        &self,
        source_key: &str,
        announcements: &[Announcement],
    ) -> TrackerResult<Vec<Announcement>> {
        let mut document = self.load();
        let merged = document.replace_source(source_key, announcements, Utc::now());
        self.save(&document)?;
        Ok(merged)
    }

    fn status(&self) -> CacheStatus {
        self.load().status_at(Utc::now())
    }

    fn announcements(&self) -> Vec<Announcement> {
        self.load().announcements
    }

    fn announcements_by_source(&self, source_key: &str) -> Vec<Announcement> {
        self.load().by_source(source_key)
    }

    fn needs_refresh(&self) -> bool {
        is_stale(self.load().last_fetch)
    }

    fn clear(&self) -> TrackerResult<()> {
        self.save(&CacheDocument::default())
    }
}
