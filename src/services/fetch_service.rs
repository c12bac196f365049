use std::thread;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::DEFAULT_REQUEST_DELAY_MS;
use crate::domain::Announcement;
use crate::errors::{TrackerError, TrackerResult};
use crate::sources::{SourceFetcher, SourceRegistry};
use crate::storage::CacheStore;

/// Pause between two sources of a batch.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(DEFAULT_REQUEST_DELAY_MS);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    /// 1-based position of `source` in the batch.
    pub current: usize,
    pub total: usize,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchedSource {
    pub source: String,
    pub name: String,
    pub count: usize,
    pub announcements: Vec<Announcement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedSource {
    pub source: String,
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub successful: Vec<FetchedSource>,
    pub failed: Vec<FailedSource>,
    pub total_announcements: usize,
}

pub struct FetchService<C: CacheStore> {
    registry: SourceRegistry,
    cache: C,
    request_delay: Duration,
}

impl<C: CacheStore> FetchService<C> {
    pub fn new(registry: SourceRegistry, cache: C) -> Self {
        Self {
            registry,
            cache,
            request_delay: DEFAULT_REQUEST_DELAY,
        }
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Fetch one source and replace its entries in the cache.
    pub fn fetch_source(&self, key: &str) -> TrackerResult<FetchedSource> {
        let source = self
            .registry
            .get(key)
            .ok_or_else(|| TrackerError::UnknownSource(key.to_string()))?;

        self.refresh(source)
    }

    fn refresh(&self, source: &dyn SourceFetcher) -> TrackerResult<FetchedSource> {
        let info = source.info();
        let announcements = source.fetch()?;
        self.cache.update_source(&info.key, &announcements)?;

        info!(source = %info.key, count = announcements.len(), "Source refreshed");

        Ok(FetchedSource {
            source: info.key,
            name: info.name,
            count: announcements.len(),
            announcements,
        })
    }

    /// Refresh every source in registry order, one at a time.
    ///
    /// A failing source is recorded in `failed` and the batch moves on.
    pub fn fetch_all<F>(&self, mut on_progress: F) -> BatchResult
    where
        F: FnMut(&Progress),
    {
        let total = self.registry.len();
        let mut result = BatchResult::default();

        for (index, source) in self.registry.sources().enumerate() {
            let info = source.info();
            on_progress(&Progress {
                current: index + 1,
                total,
                source: info.name.clone(),
            });

            match self.refresh(source) {
                Ok(fetched) => {
                    result.total_announcements += fetched.count;
                    result.successful.push(fetched);
                }
                Err(e) => {
                    warn!(source = %info.key, error = %e, "Source failed");
                    result.failed.push(FailedSource {
                        source: info.key,
                        name: info.name,
                        error: e.to_string(),
                    });
                }
            }

            if index + 1 < total && !self.request_delay.is_zero() {
                thread::sleep(self.request_delay);
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CacheDocument;
    use crate::sources::traits::MockSourceFetcher;
    use crate::sources::SourceInfo;
    use crate::storage::traits::MockCacheStore;
    use crate::storage::JsonFileStore;
    use tempfile::TempDir;

    fn source(key: &str, titles: &[&str]) -> Box<dyn SourceFetcher> {
        let items: Vec<Announcement> = titles
            .iter()
            .map(|t| {
                Announcement::new(key, *t)
                    .with_date("2024-01-01")
                    .with_link(Some(format!("https://{}.example.com/{}", key, t)))
            })
            .collect();

        let mut mock = MockSourceFetcher::new();
        mock.expect_info()
            .return_const(SourceInfo::new(key, &key.to_uppercase(), "mock"));
        mock.expect_fetch().returning(move || Ok(items.clone()));
        Box::new(mock)
    }

    fn failing(key: &str) -> Box<dyn SourceFetcher> {
        let mut mock = MockSourceFetcher::new();
        mock.expect_info()
            .return_const(SourceInfo::new(key, &key.to_uppercase(), "mock"));
        mock.expect_fetch()
            .returning(|| Err(TrackerError::FeedParse("boom".to_string())));
        Box::new(mock)
    }

    fn service(sources: Vec<Box<dyn SourceFetcher>>) -> (TempDir, FetchService<JsonFileStore>) {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("announcements.json"));
        let mut registry = SourceRegistry::new();
        for source in sources {
            registry.register(source);
        }
        let service = FetchService::new(registry, store).with_request_delay(Duration::ZERO);
        (dir, service)
    }

    #[test]
    fn test_fetch_source_updates_cache() {
        let (_dir, service) = service(vec![source("a", &["one", "two"])]);

        let fetched = service.fetch_source("a").unwrap();

        assert_eq!(fetched.count, 2);
        assert_eq!(fetched.name, "A");
        assert_eq!(service.cache().status().sources["a"].count, 2);
        assert_eq!(service.cache().announcements().len(), 2);
    }

    #[test]
    fn test_fetch_unknown_source() {
        let (_dir, service) = service(vec![source("a", &["one"])]);

        let result = service.fetch_source("missing");

        assert!(matches!(result, Err(TrackerError::UnknownSource(key)) if key == "missing"));
    }

    #[test]
    fn test_fetch_all_isolates_failures() {
        let (_dir, service) = service(vec![
            source("a", &["one"]),
            failing("b"),
            source("c", &["two", "three"]),
        ]);

        let result = service.fetch_all(|_| {});

        let ok: Vec<&str> = result.successful.iter().map(|s| s.source.as_str()).collect();
        assert_eq!(ok, vec!["a", "c"]);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].source, "b");
        assert!(result.failed[0].error.contains("boom"));
        assert_eq!(result.total_announcements, 3);
        assert!(!service.cache().status().sources.contains_key("b"));
    }

    #[test]
    fn test_fetch_all_reports_progress_in_order() {
        let (_dir, service) = service(vec![source("a", &[]), source("b", &[])]);
        let mut seen = Vec::new();

        service.fetch_all(|p| seen.push(p.clone()));

        assert_eq!(
            seen,
            vec![
                Progress { current: 1, total: 2, source: "A".to_string() },
                Progress { current: 2, total: 2, source: "B".to_string() },
            ]
        );
    }

    #[test]
    fn test_fetch_all_empty_registry() {
        let (_dir, service) = service(vec![]);
        let mut calls = 0;

        let result = service.fetch_all(|_| calls += 1);

        assert_eq!(result, BatchResult::default());
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_storage_failure_marks_source_failed() {
        let mut cache = MockCacheStore::new();
        cache
            .expect_update_source()
            .returning(|_, _| Err(TrackerError::Storage("disk full".to_string())));
        let mut registry = SourceRegistry::new();
        registry.register(source("a", &["one"]));
        let service = FetchService::new(registry, cache).with_request_delay(Duration::ZERO);

        let result = service.fetch_all(|_| {});

        assert!(result.successful.is_empty());
        assert!(result.failed[0].error.contains("disk full"));
    }

    #[test]
    fn test_refetch_replaces_previous_entries() {
        let (_dir, service) = service(vec![source("a", &["one", "two"])]);
        service.fetch_source("a").unwrap();

        let mut document = service.cache().load();
        document.announcements.push(Announcement::new("a", "stale"));
        service.cache().save(&document).unwrap();
        assert_eq!(service.cache().announcements().len(), 3);

        service.fetch_source("a").unwrap();

        let titles: Vec<String> = service
            .cache()
            .announcements()
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(titles.len(), 2);
        assert!(!titles.contains(&"stale".to_string()));
        assert_ne!(service.cache().load(), CacheDocument::default());
    }
}
