pub mod sources;

pub use sources::{
    ApiFeedConfig, FeedConfig, FieldsConfig, GithubFeedConfig, RssFeedConfig, SourceConfig,
    SourcesConfig, TagRule,
};

use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{TrackerError, TrackerResult};

pub const DEFAULT_REQUEST_DELAY_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct Config {
    pub sources_path: PathBuf,
    pub cache_path: PathBuf,
    pub request_delay: Duration,
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    fn home_dir() -> PathBuf {
        std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn default_sources_path() -> PathBuf {
        Self::home_dir()
            .join(".config")
            .join("keynote-tracker")
            .join("sources.toml")
    }

    pub fn default_cache_path() -> PathBuf {
        Self::home_dir()
            .join(".keynote-tracker")
            .join("data")
            .join("announcements.json")
    }

    pub fn from_env() -> TrackerResult<Self> {
        // Try to load .env from executable's directory first
        if let Some(dir) = Self::exe_dir() {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        let sources_path = std::env::var_os("KEYNOTE_TRACKER_SOURCES")
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_sources_path);

        let cache_path = std::env::var_os("KEYNOTE_TRACKER_CACHE")
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_cache_path);

        let request_delay = match std::env::var("KEYNOTE_TRACKER_REQUEST_DELAY_MS") {
            Ok(raw) => parse_delay(&raw)?,
            Err(_) => Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
        };

        Ok(Self {
            sources_path,
            cache_path,
            request_delay,
        })
    }
}

fn parse_delay(raw: &str) -> TrackerResult<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| {
            TrackerError::Config(format!(
                "KEYNOTE_TRACKER_REQUEST_DELAY_MS must be a number of milliseconds, got '{}'",
                raw
            ))
        })
}
