use serde::Serialize;

use crate::domain::{Announcement, FeedType};
use crate::errors::TrackerResult;

/// One fetch strategy bound to one endpoint.
#[cfg_attr(test, mockall::automock)]
pub trait FeedFetcher: Send + Sync {
    fn feed_type(&self) -> FeedType;

    /// Fetch and normalize the feed. Failures are logged and turned into an
    /// empty list (or a placeholder for release feeds), never returned.
    fn fetch(&self) -> Vec<Announcement>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceInfo {
    pub key: String,
    pub name: String,
    pub description: String,
}

impl SourceInfo {
    pub fn new(key: &str, name: &str, description: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

/// A configured source: one or more feeds fetched as a unit.
#[cfg_attr(test, mockall::automock)]
pub trait SourceFetcher: Send + Sync {
    fn info(&self) -> SourceInfo;

    fn fetch(&self) -> TrackerResult<Vec<Announcement>>;
}
