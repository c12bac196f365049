use crate::config::SourcesConfig;
use crate::sources::client::build_client;
use crate::sources::source::ConfiguredSource;
use crate::sources::traits::{SourceFetcher, SourceInfo};

/// The configured sources, in declaration order.
///
/// Built once from validated configuration; to pick up configuration
/// changes, build a new registry.
pub struct SourceRegistry {
    sources: Vec<Box<dyn SourceFetcher>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn from_config(config: &SourcesConfig) -> Self {
        let client = build_client();
        let mut registry = Self::new();

        for source in &config.sources {
            registry.register(Box::new(ConfiguredSource::from_config(&client, source)));
        }

        registry
    }

    pub fn register(&mut self, source: Box<dyn SourceFetcher>) {
        self.sources.push(source);
    }

    pub fn get(&self, key: &str) -> Option<&dyn SourceFetcher> {
        self.sources
            .iter()
            .find(|s| s.info().key == key)
            .map(|s| s.as_ref())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn sources(&self) -> impl Iterator<Item = &dyn SourceFetcher> {
        self.sources.iter().map(|s| s.as_ref())
    }

    pub fn keys(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.info().key).collect()
    }

    pub fn available(&self) -> Vec<SourceInfo> {
        self.sources.iter().map(|s| s.info()).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
