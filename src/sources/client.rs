use std::time::Duration;

use reqwest::blocking::Client;

pub const USER_AGENT: &str = "keynote-tracker";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_LIMIT: usize = 20;

/// HTTP client shared by every feed of a registry.
pub fn build_client() -> Client {
    Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| Client::new())
}
