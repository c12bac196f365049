use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};
use url::Url;

use crate::domain::FeedType;
use crate::errors::{TrackerError, TrackerResult};
use crate::sources::fields::lookup;
use crate::sources::transform::TransformConfig;

/// Sources shipped with the binary, written out on first run.
pub const DEFAULT_SOURCES: &str = include_str!("../../config/sources.default.toml");

const REPO_PATTERN: &str = r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$";

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub key: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeedConfig {
    Rss(RssFeedConfig),
    Github(GithubFeedConfig),
    Api(ApiFeedConfig),
}

impl FeedConfig {
    pub fn feed_type(&self) -> FeedType {
        match self {
            FeedConfig::Rss(_) => FeedType::Rss,
            FeedConfig::Github(_) => FeedType::Github,
            FeedConfig::Api(_) => FeedType::Api,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RssFeedConfig {
    pub url: String,
    pub limit: Option<usize>,
    pub category: Option<String>,
    #[serde(default)]
    pub fields: FieldsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubFeedConfig {
    /// `owner/name`
    pub repo: String,
    /// Releases API host, e.g. a GitHub Enterprise instance.
    pub api_base: Option<String>,
    pub limit: Option<usize>,
    pub category: Option<String>,
    #[serde(default)]
    pub fields: FieldsConfig,
    pub tag_rule: Option<TagRule>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFeedConfig {
    pub url: String,
    pub limit: Option<usize>,
    pub category: Option<String>,
    #[serde(default)]
    pub fields: FieldsConfig,
    pub method: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Request timeout in milliseconds.
    pub timeout: Option<u64>,
    pub transform: Option<TransformConfig>,
}

/// Per-feed field names, each with an optional fallback.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldsConfig {
    pub title: Option<String>,
    pub title_fallback: Option<String>,
    pub date: Option<String>,
    pub date_fallback: Option<String>,
    pub description: Option<String>,
    pub description_fallback: Option<String>,
    pub content: Option<String>,
    pub content_fallback: Option<String>,
    pub link: Option<String>,
    pub link_fallback: Option<String>,
    pub category: Option<String>,
    pub category_fallback: Option<String>,
    pub tags: Option<String>,
    pub tags_fallback: Option<String>,
}

/// Tags picked from a boolean field of a release.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRule {
    pub field: String,
    #[serde(default)]
    pub when_true: Vec<String>,
    #[serde(default)]
    pub when_false: Vec<String>,
}

impl Default for TagRule {
    fn default() -> Self {
        Self {
            field: "prerelease".to_string(),
            when_true: vec!["prerelease".to_string()],
            when_false: vec!["release".to_string()],
        }
    }
}

impl TagRule {
    pub fn tags_for(&self, item: &Value) -> Vec<String> {
        match lookup(item, &self.field) {
            Some(Value::Bool(true)) => self.when_true.clone(),
            _ => self.when_false.clone(),
        }
    }
}

impl SourcesConfig {
    /// Parse and validate a TOML sources document.
    pub fn parse(content: &str) -> TrackerResult<Self> {
        let config: SourcesConfig =
            toml::from_str(content).map_err(|e| TrackerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> TrackerResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            TrackerError::Config(format!("Failed to load config from {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    pub fn bundled_default() -> TrackerResult<Self> {
        Self::parse(DEFAULT_SOURCES)
    }

    /// Load the user's sources, writing the bundled default first if the
    /// file does not exist. Falls back to the bundled default when the user
    /// file cannot be loaded.
    pub fn load_or_init<P: AsRef<Path>>(path: P) -> TrackerResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            match write_default(path) {
                Ok(()) => info!(path = %path.display(), "Created default configuration"),
                Err(e) => warn!(path = %path.display(), error = %e, "Could not write default configuration"),
            }
        }

        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!(error = %e, "Error loading sources config, using bundled default");
                Self::bundled_default().map_err(|fallback| {
                    TrackerError::Config(format!(
                        "{}. Fallback also failed: {}",
                        e, fallback
                    ))
                })
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.key == key)
    }

    pub fn validate(&self) -> TrackerResult<()> {
        let repo_pattern =
            Regex::new(REPO_PATTERN).map_err(|e| TrackerError::Config(e.to_string()))?;
        let mut seen = HashSet::new();

        for source in &self.sources {
            if source.key.trim().is_empty() {
                return Err(TrackerError::Config("Source is missing required field: key".to_string()));
            }
            if !seen.insert(source.key.as_str()) {
                return Err(TrackerError::invalid_source(&source.key, "duplicate source key"));
            }
            source.validate(&repo_pattern)?;
        }

        Ok(())
    }
}

impl SourceConfig {
    fn validate(&self, repo_pattern: &Regex) -> TrackerResult<()> {
        if self.name.trim().is_empty() {
            return Err(TrackerError::invalid_source(&self.key, "missing required field: name"));
        }
        if self.description.trim().is_empty() {
            return Err(TrackerError::invalid_source(&self.key, "missing required field: description"));
        }
        if self.feeds.is_empty() {
            return Err(TrackerError::invalid_source(&self.key, "feeds must not be empty"));
        }

        for (index, feed) in self.feeds.iter().enumerate() {
            match feed {
                FeedConfig::Rss(rss) => self.check_url(index, feed.feed_type(), &rss.url)?,
                FeedConfig::Api(api) => self.check_url(index, feed.feed_type(), &api.url)?,
                FeedConfig::Github(github) => {
                    if !repo_pattern.is_match(&github.repo) {
                        return Err(TrackerError::invalid_source(
                            &self.key,
                            format!(
                                "feed[{}] (github) repo '{}' must be in owner/name form",
                                index, github.repo
                            ),
                        ));
                    }
                    if let Some(api_base) = &github.api_base {
                        self.check_url(index, feed.feed_type(), api_base)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn check_url(&self, index: usize, feed_type: FeedType, raw: &str) -> TrackerResult<()> {
        let valid = Url::parse(raw)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false);

        if valid {
            Ok(())
        } else {
            Err(TrackerError::invalid_source(
                &self.key,
                format!("feed[{}] ({}) has invalid url: {}", index, feed_type, raw),
            ))
        }
    }
}

fn write_default(path: &Path) -> TrackerResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, DEFAULT_SOURCES)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const VALID: &str = r#"
        [[sources]]
        key = "rust"
        name = "Rust"
        description = "Rust releases"

        [[sources.feeds]]
        type = "rss"
        url = "https://blog.rust-lang.org/feed.xml"
        limit = 5

        [sources.feeds.fields]
        description = "content"
        descriptionFallback = "summary"

        [[sources.feeds]]
        type = "github"
        repo = "rust-lang/rust"

        [[sources]]
        key = "custom"
        name = "Custom"
        description = "Custom API"

        [[sources.feeds]]
        type = "api"
        url = "https://api.example.com/posts"
        method = "POST"
        timeout = 5000
        transform = "data.posts"

        [sources.feeds.headers]
        Authorization = "Token abc"
    "#;

    #[test]
    fn test_parse_valid_config() {
        let config = SourcesConfig::parse(VALID).unwrap();

        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[0].key, "rust");
        assert_eq!(config.sources[0].feeds.len(), 2);

        match &config.sources[0].feeds[0] {
            FeedConfig::Rss(rss) => {
                assert_eq!(rss.limit, Some(5));
                assert_eq!(rss.fields.description.as_deref(), Some("content"));
                assert_eq!(rss.fields.description_fallback.as_deref(), Some("summary"));
            }
            other => panic!("expected rss feed, got {:?}", other.feed_type()),
        }

        match &config.sources[1].feeds[0] {
            FeedConfig::Api(api) => {
                assert_eq!(api.method.as_deref(), Some("POST"));
                assert_eq!(api.timeout, Some(5000));
                assert_eq!(api.headers.get("Authorization").map(String::as_str), Some("Token abc"));
                assert_eq!(api.transform, Some(TransformConfig::Path("data.posts".to_string())));
            }
            other => panic!("expected api feed, got {:?}", other.feed_type()),
        }
    }

    #[test]
    fn test_declaration_order_preserved() {
        let config = SourcesConfig::parse(VALID).unwrap();
        let keys: Vec<&str> = config.sources.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["rust", "custom"]);
    }

    #[test]
    fn test_unknown_feed_type_rejected() {
        let content = r#"
            [[sources]]
            key = "x"
            name = "X"
            description = "X"

            [[sources.feeds]]
            type = "ftp"
            url = "ftp://example.com"
        "#;
        assert!(SourcesConfig::parse(content).is_err());
    }

    #[test]
    fn test_missing_required_field_rejected() {
        let content = r#"
            [[sources]]
            key = "x"
            name = "X"
            description = "X"

            [[sources.feeds]]
            type = "github"
        "#;
        assert!(SourcesConfig::parse(content).is_err());
    }

    #[test]
    fn test_invalid_repo_rejected() {
        let content = r#"
            [[sources]]
            key = "x"
            name = "X"
            description = "X"

            [[sources.feeds]]
            type = "github"
            repo = "not-a-repo"
        "#;
        let err = SourcesConfig::parse(content).unwrap_err();
        assert!(err.to_string().contains("owner/name"));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let content = r#"
            [[sources]]
            key = "x"
            name = "X"
            description = "X"

            [[sources.feeds]]
            type = "rss"
            url = "not a url"
        "#;
        let err = SourcesConfig::parse(content).unwrap_err();
        assert!(err.to_string().contains("invalid url"));
    }

    #[test]
    fn test_github_api_base() {
        let content = r#"
            [[sources]]
            key = "internal"
            name = "Internal"
            description = "Enterprise releases"

            [[sources.feeds]]
            type = "github"
            repo = "platform/runtime"
            apiBase = "https://github.example.com/api/v3"
        "#;
        let config = SourcesConfig::parse(content).unwrap();
        match &config.sources[0].feeds[0] {
            FeedConfig::Github(github) => {
                assert_eq!(github.api_base.as_deref(), Some("https://github.example.com/api/v3"))
            }
            other => panic!("expected github feed, got {:?}", other.feed_type()),
        }

        let invalid = content.replace("https://github.example.com/api/v3", "github.example.com");
        let err = SourcesConfig::parse(&invalid).unwrap_err();
        assert!(err.to_string().contains("invalid url"));
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let content = r#"
            [[sources]]
            key = "x"
            name = "X"
            description = "X"
            [[sources.feeds]]
            type = "rss"
            url = "https://example.com/feed"

            [[sources]]
            key = "x"
            name = "X again"
            description = "X"
            [[sources.feeds]]
            type = "rss"
            url = "https://example.com/feed2"
        "#;
        let err = SourcesConfig::parse(content).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_empty_description_rejected() {
        let content = r#"
            [[sources]]
            key = "x"
            name = "X"
            description = ""
            [[sources.feeds]]
            type = "rss"
            url = "https://example.com/feed"
        "#;
        assert!(SourcesConfig::parse(content).is_err());
    }

    #[test]
    fn test_bundled_default_is_valid() {
        let config = SourcesConfig::bundled_default().unwrap();
        assert!(!config.sources.is_empty());
        assert!(config.get("rust").is_some());
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(VALID.as_bytes()).unwrap();

        let config = SourcesConfig::load(temp_file.path()).unwrap();
        assert_eq!(config.sources.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(SourcesConfig::load("/nonexistent/path/sources.toml").is_err());
    }

    #[test]
    fn test_load_or_init_writes_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("sources.toml");

        let config = SourcesConfig::load_or_init(&path).unwrap();

        assert!(path.exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_SOURCES);
        assert!(config.get("rust").is_some());
    }

    #[test]
    fn test_load_or_init_falls_back_on_invalid_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"this is not valid toml {{{").unwrap();

        let config = SourcesConfig::load_or_init(temp_file.path()).unwrap();
        assert!(config.get("rust").is_some());
    }

    #[test]
    fn test_tag_rule_default() {
        let rule = TagRule::default();
        assert_eq!(rule.tags_for(&serde_json::json!({ "prerelease": true })), vec!["prerelease"]);
        assert_eq!(rule.tags_for(&serde_json::json!({ "prerelease": false })), vec!["release"]);
        assert_eq!(rule.tags_for(&serde_json::json!({})), vec!["release"]);
    }

    #[test]
    fn test_tag_rule_custom_field() {
        let rule = TagRule {
            field: "draft".to_string(),
            when_true: vec!["draft".to_string()],
            when_false: vec![],
        };
        assert_eq!(rule.tags_for(&serde_json::json!({ "draft": true })), vec!["draft"]);
        assert!(rule.tags_for(&serde_json::json!({ "draft": false, "prerelease": true })).is_empty());
    }
}
