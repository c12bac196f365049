use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use reqwest::blocking::Client;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::config::ApiFeedConfig;
use crate::domain::announcement::{DEFAULT_CATEGORY, DEFAULT_TITLE};
use crate::domain::{Announcement, FeedType};
use crate::errors::{TrackerError, TrackerResult};
use crate::sources::client::{DEFAULT_LIMIT, DEFAULT_TIMEOUT};
use crate::sources::fields::RawItem;
use crate::sources::normalizer::{Field, FieldMapping};
use crate::sources::traits::FeedFetcher;
use crate::sources::transform::TransformConfig;

/// Arbitrary JSON endpoint, optionally reshaped by a declarative transform.
pub struct ApiFetcher {
    client: Client,
    source_key: String,
    url: String,
    method: String,
    headers: BTreeMap<String, String>,
    timeout: Duration,
    limit: usize,
    category: Option<String>,
    transform: Option<TransformConfig>,
    mapping: FieldMapping,
}

impl ApiFetcher {
    pub fn new(client: Client, source_key: &str, config: &ApiFeedConfig) -> Self {
        Self {
            client,
            source_key: source_key.to_string(),
            url: config.url.clone(),
            method: config.method.clone().unwrap_or_else(|| "GET".to_string()),
            headers: config.headers.clone(),
            timeout: config
                .timeout
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_TIMEOUT),
            limit: config.limit.unwrap_or(DEFAULT_LIMIT),
            category: config.category.clone(),
            transform: config.transform.clone(),
            mapping: FieldMapping::api().with_overrides(&config.fields),
        }
    }

    fn fetch_raw(&self) -> TrackerResult<Vec<RawItem>> {
        let method = Method::from_bytes(self.method.to_uppercase().as_bytes())
            .map_err(|_| TrackerError::Config(format!("invalid HTTP method '{}'", self.method)))?;

        let mut request = self
            .client
            .request(method, &self.url)
            .timeout(self.timeout);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let bytes = request.send()?.error_for_status()?.bytes()?;
        let data: Value = serde_json::from_slice(&bytes)?;

        self.shape(data)
    }

    /// Turn a response body into at most `limit` raw items.
    pub fn shape(&self, data: Value) -> TrackerResult<Vec<RawItem>> {
        let items = match &self.transform {
            Some(transform) => transform.apply(&data)?,
            None => match data {
                Value::Array(items) => items,
                _ => {
                    return Err(TrackerError::Transform(
                        "response is not an array and no transform is configured".to_string(),
                    ))
                }
            },
        };

        Ok(items.into_iter().take(self.limit).collect())
    }

    pub fn normalize(&self, item: &RawItem) -> Announcement {
        let title = self
            .mapping
            .text(item, Field::Title)
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        let date = self
            .mapping
            .text(item, Field::Date)
            .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
        let category = self
            .mapping
            .text(item, Field::Category)
            .or_else(|| self.category.clone())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        Announcement::new(self.source_key.as_str(), title)
            .with_date(date)
            .with_description(self.mapping.text(item, Field::Description).unwrap_or_default())
            .with_content(self.mapping.text(item, Field::Content).unwrap_or_default())
            .with_link(self.mapping.text(item, Field::Link))
            .with_category(category)
            .with_tags(self.mapping.tags(item))
    }
}

impl FeedFetcher for ApiFetcher {
    fn feed_type(&self) -> FeedType {
        FeedType::Api
    }

    fn fetch(&self) -> Vec<Announcement> {
        match self.fetch_raw() {
            Ok(items) => {
                debug!(source = %self.source_key, url = %self.url, count = items.len(), "Fetched API feed");
                items.iter().map(|item| self.normalize(item)).collect()
            }
            Err(TrackerError::Transform(reason)) => {
                warn!(source = %self.source_key, url = %self.url, reason = %reason, "Transform did not produce a list of items");
                Vec::new()
            }
            Err(e) => {
                error!(source = %self.source_key, url = %self.url, error = %e, "Error fetching custom API");
                Vec::new()
            }
        }
    }
}
