use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::{debug, error};

use crate::config::{GithubFeedConfig, TagRule};
use crate::domain::announcement::{truncate_chars, DEFAULT_TITLE, DESCRIPTION_LIMIT};
use crate::domain::{Announcement, FeedType};
use crate::errors::{TrackerError, TrackerResult};
use crate::sources::client::{DEFAULT_LIMIT, DEFAULT_TIMEOUT};
use crate::sources::fields::{lookup, RawItem};
use crate::sources::normalizer::{value_to_text, Field, FieldMapping};
use crate::sources::traits::FeedFetcher;

pub const GITHUB_API: &str = "https://api.github.com";

const RELEASE_CATEGORY: &str = "release";
const PLACEHOLDER_CATEGORY: &str = "info";

/// Latest releases of one repository.
pub struct ReleaseFetcher {
    client: Client,
    source_key: String,
    repo: String,
    api_base: String,
    limit: usize,
    category: Option<String>,
    headers: BTreeMap<String, String>,
    tag_rule: TagRule,
    mapping: FieldMapping,
}

impl ReleaseFetcher {
    pub fn new(client: Client, source_key: &str, config: &GithubFeedConfig) -> Self {
        Self {
            client,
            source_key: source_key.to_string(),
            repo: config.repo.clone(),
            api_base: config
                .api_base
                .as_deref()
                .unwrap_or(GITHUB_API)
                .trim_end_matches('/')
                .to_string(),
            limit: config.limit.unwrap_or(DEFAULT_LIMIT),
            category: config.category.clone(),
            headers: config.headers.clone(),
            tag_rule: config.tag_rule.clone().unwrap_or_default(),
            mapping: FieldMapping::releases().with_overrides(&config.fields),
        }
    }

    /// Point the fetcher at a different API host.
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    pub fn releases_url(&self) -> String {
        format!("{}/repos/{}/releases", self.api_base, self.repo)
    }

    pub fn releases_page(&self) -> String {
        format!("https://github.com/{}/releases", self.repo)
    }

    fn fetch_raw(&self) -> TrackerResult<Vec<RawItem>> {
        let mut request = self
            .client
            .get(self.releases_url())
            .header(ACCEPT, "application/vnd.github.v3+json")
            .timeout(DEFAULT_TIMEOUT);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let bytes = request.send()?.error_for_status()?.bytes()?;
        let data: Value = serde_json::from_slice(&bytes)?;

        match data {
            Value::Array(releases) => Ok(releases.into_iter().take(self.limit).collect()),
            _ => Err(TrackerError::FeedParse(format!(
                "expected a list of releases from {}",
                self.releases_url()
            ))),
        }
    }

    pub fn normalize(&self, release: &RawItem) -> Announcement {
        let title = self
            .mapping
            .text(release, Field::Title)
            .or_else(|| lookup(release, "tag_name").and_then(value_to_text))
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        let body = self.mapping.text(release, Field::Description);
        let content = self
            .mapping
            .text(release, Field::Content)
            .or_else(|| body.clone())
            .unwrap_or_default();
        let description = body
            .map(|b| truncate_chars(&b, DESCRIPTION_LIMIT))
            .unwrap_or_else(|| "New release".to_string());

        Announcement::new(self.source_key.as_str(), title)
            .with_date(self.mapping.text(release, Field::Date).unwrap_or_default())
            .with_description(description)
            .with_content(content)
            .with_link(self.mapping.text(release, Field::Link))
            .with_category(
                self.category
                    .clone()
                    .unwrap_or_else(|| RELEASE_CATEGORY.to_string()),
            )
            .with_tags(self.tag_rule.tags_for(release))
    }

    /// Stand-in record pointing at the releases page when the API is unavailable.
    pub fn placeholder(&self) -> Announcement {
        let page = self.releases_page();

        Announcement::new(
            self.source_key.as_str(),
            format!("{} - Check GitHub for updates", self.repo),
        )
        .with_date(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
        .with_description(format!(
            "Visit GitHub for the latest releases from {}",
            self.repo
        ))
        .with_content(format!("Unable to fetch releases. Please check: {}", page))
        .with_link(Some(page))
        .with_category(
            self.category
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_CATEGORY.to_string()),
        )
        .with_tags(vec!["error".to_string()])
    }
}

impl FeedFetcher for ReleaseFetcher {
    fn feed_type(&self) -> FeedType {
        FeedType::Github
    }

    fn fetch(&self) -> Vec<Announcement> {
        match self.fetch_raw() {
            Ok(releases) => {
                debug!(source = %self.source_key, repo = %self.repo, count = releases.len(), "Fetched releases");
                releases.iter().map(|r| self.normalize(r)).collect()
            }
            Err(e) => {
                error!(source = %self.source_key, repo = %self.repo, error = %e, "Error fetching GitHub releases");
                vec![self.placeholder()]
            }
        }
    }
}
