use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_CATEGORY: &str = "general";

/// Maximum number of characters kept when a description is derived from content.
pub const DESCRIPTION_LIMIT: usize = 300;

/// Canonical record for one upstream item (release, post, keynote update).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub source: String,
    pub title: String,
    /// ISO-8601 when the upstream date was understood, the raw upstream string otherwise.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl Announcement {
    pub fn new(source: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            title: title.into(),
            date: String::new(),
            description: String::new(),
            content: String::new(),
            link: None,
            category: default_category(),
            tags: Vec::new(),
        }
    }

    /// Dedup key: the link, or the title when there is no link.
    pub fn identity_key(&self) -> &str {
        match self.link.as_deref() {
            Some(link) if !link.is_empty() => link,
            _ => &self.title,
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_link(mut self, link: Option<String>) -> Self {
        self.link = link;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Keep the first `limit` characters (not bytes) of `text`.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
