use serde_json::Value;

use crate::config::FieldsConfig;
use crate::sources::fields::{resolve_field, RawItem};

/// Canonical announcement fields that can be mapped from a raw item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Date,
    Description,
    Content,
    Link,
    Category,
    Tags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldPath {
    pub primary: String,
    pub fallback: Option<String>,
}

impl FieldPath {
    fn new(primary: &str) -> Self {
        Self {
            primary: primary.to_string(),
            fallback: None,
        }
    }

    fn or(mut self, fallback: &str) -> Self {
        self.fallback = Some(fallback.to_string());
        self
    }

    fn apply(&mut self, primary: &Option<String>, fallback: &Option<String>) {
        if let Some(primary) = primary {
            self.primary = primary.clone();
        }
        if fallback.is_some() {
            self.fallback = fallback.clone();
        }
    }
}

/// Where each canonical field is read from in a raw item.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
    pub title: FieldPath,
    pub date: FieldPath,
    pub description: FieldPath,
    pub content: FieldPath,
    pub link: FieldPath,
    pub category: FieldPath,
    pub tags: FieldPath,
}

impl FieldMapping {
    /// Names produced for syndication entries.
    pub fn syndication() -> Self {
        Self {
            title: FieldPath::new("title"),
            date: FieldPath::new("pubDate").or("isoDate"),
            description: FieldPath::new("summary"),
            content: FieldPath::new("content"),
            link: FieldPath::new("link"),
            category: FieldPath::new("category"),
            tags: FieldPath::new("categories"),
        }
    }

    /// Names used by the release API.
    pub fn releases() -> Self {
        Self {
            title: FieldPath::new("name").or("tag_name"),
            date: FieldPath::new("published_at").or("created_at"),
            description: FieldPath::new("body"),
            content: FieldPath::new("body"),
            link: FieldPath::new("html_url"),
            category: FieldPath::new("category"),
            tags: FieldPath::new("tags"),
        }
    }

    /// Generic API items already carry canonical names.
    pub fn api() -> Self {
        Self {
            title: FieldPath::new("title"),
            date: FieldPath::new("date"),
            description: FieldPath::new("description"),
            content: FieldPath::new("content").or("description"),
            link: FieldPath::new("link"),
            category: FieldPath::new("category"),
            tags: FieldPath::new("tags"),
        }
    }

    /// Apply per-feed overrides. Primary and fallback names are replaced
    /// independently, so a custom primary keeps the built-in fallback.
    pub fn with_overrides(mut self, fields: &FieldsConfig) -> Self {
        self.title.apply(&fields.title, &fields.title_fallback);
        self.date.apply(&fields.date, &fields.date_fallback);
        self.description.apply(&fields.description, &fields.description_fallback);
        self.content.apply(&fields.content, &fields.content_fallback);
        self.link.apply(&fields.link, &fields.link_fallback);
        self.category.apply(&fields.category, &fields.category_fallback);
        self.tags.apply(&fields.tags, &fields.tags_fallback);
        self
    }

    fn path(&self, field: Field) -> &FieldPath {
        match field {
            Field::Title => &self.title,
            Field::Date => &self.date,
            Field::Description => &self.description,
            Field::Content => &self.content,
            Field::Link => &self.link,
            Field::Category => &self.category,
            Field::Tags => &self.tags,
        }
    }

    pub fn value<'a>(&self, item: &'a RawItem, field: Field) -> Option<&'a Value> {
        let path = self.path(field);
        resolve_field(item, &path.primary, path.fallback.as_deref())
    }

    /// The field as text. Empty strings and non-scalar values count as absent.
    pub fn text(&self, item: &RawItem, field: Field) -> Option<String> {
        self.value(item, field).and_then(value_to_text)
    }

    /// Tags are only taken from a sequence; anything else yields no tags.
    pub fn tags(&self, item: &RawItem) -> Vec<String> {
        match self.value(item, Field::Tags) {
            Some(Value::Array(values)) => values.iter().filter_map(value_to_text).collect(),
            _ => Vec::new(),
        }
    }
}

pub fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
