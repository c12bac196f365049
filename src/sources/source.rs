use reqwest::blocking::Client;
use tracing::debug;

use crate::config::{FeedConfig, SourceConfig};
use crate::domain::Announcement;
use crate::errors::TrackerResult;
use crate::sources::api::ApiFetcher;
use crate::sources::github::ReleaseFetcher;
use crate::sources::rss::SyndicationFetcher;
use crate::sources::traits::{FeedFetcher, SourceFetcher, SourceInfo};

/// A source built from configuration. Feeds are fetched one after the other
/// and their announcements concatenated in feed order.
pub struct ConfiguredSource {
    info: SourceInfo,
    feeds: Vec<Box<dyn FeedFetcher>>,
}

impl ConfiguredSource {
    pub fn new(info: SourceInfo) -> Self {
        Self {
            info,
            feeds: Vec::new(),
        }
    }

    pub fn from_config(client: &Client, config: &SourceConfig) -> Self {
        let info = SourceInfo::new(&config.key, &config.name, &config.description);

        config
            .feeds
            .iter()
            .fold(Self::new(info), |source, feed| {
                let fetcher: Box<dyn FeedFetcher> = match feed {
                    FeedConfig::Rss(rss) => {
                        Box::new(SyndicationFetcher::new(client.clone(), &config.key, rss))
                    }
                    FeedConfig::Github(github) => {
                        Box::new(ReleaseFetcher::new(client.clone(), &config.key, github))
                    }
                    FeedConfig::Api(api) => Box::new(ApiFetcher::new(client.clone(), &config.key, api)),
                };
                source.with_feed(fetcher)
            })
    }

    pub fn with_feed(mut self, feed: Box<dyn FeedFetcher>) -> Self {
        self.feeds.push(feed);
        self
    }

    pub fn feeds(&self) -> &[Box<dyn FeedFetcher>] {
        &self.feeds
    }
}

impl SourceFetcher for ConfiguredSource {
    fn info(&self) -> SourceInfo {
        self.info.clone()
    }

    fn fetch(&self) -> TrackerResult<Vec<Announcement>> {
        let mut announcements = Vec::new();

        for feed in &self.feeds {
            let items = feed.fetch();
            debug!(source = %self.info.key, feed_type = %feed.feed_type(), count = items.len(), "Feed done");
            announcements.extend(items);
        }

        Ok(announcements)
    }
}
