//! Declarative reshaping of generic API responses.
//!
//! A transform selects the array of items inside a response, optionally keeps
//! only items matching every predicate, and optionally copies values from
//! arbitrary paths onto canonical field names. Nothing is evaluated as code.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::{TrackerError, TrackerResult};
use crate::sources::fields::lookup;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TransformConfig {
    /// Path to the item array, e.g. `"data.releases"`.
    Path(String),
    Rules(TransformRules),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformRules {
    #[serde(default)]
    pub items: String,
    #[serde(default)]
    pub filter: Vec<Predicate>,
    /// Canonical field name -> source path.
    #[serde(default)]
    pub map: BTreeMap<String, String>,
}

/// Every condition that is set must hold.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Predicate {
    pub field: String,
    pub equals: Option<Value>,
    pub not_equals: Option<Value>,
    pub exists: Option<bool>,
    pub contains: Option<String>,
}

impl Predicate {
    pub fn matches(&self, item: &Value) -> bool {
        let value = lookup(item, &self.field);

        if let Some(expected) = self.exists {
            if value.is_some() != expected {
                return false;
            }
        }

        if let Some(expected) = &self.equals {
            if value != Some(expected) {
                return false;
            }
        }

        if let Some(unexpected) = &self.not_equals {
            if value == Some(unexpected) {
                return false;
            }
        }

        if let Some(needle) = &self.contains {
            let found = match value {
                Some(Value::String(s)) => s.contains(needle.as_str()),
                Some(Value::Array(values)) => values.iter().any(|v| v.as_str() == Some(needle.as_str())),
                _ => false,
            };
            if !found {
                return false;
            }
        }

        true
    }
}

impl TransformConfig {
    pub fn apply(&self, data: &Value) -> TrackerResult<Vec<Value>> {
        match self {
            TransformConfig::Path(path) => select_items(data, path).map(|items| items.to_vec()),
            TransformConfig::Rules(rules) => rules.apply(data),
        }
    }
}

impl TransformRules {
    pub fn apply(&self, data: &Value) -> TrackerResult<Vec<Value>> {
        let items = select_items(data, &self.items)?;

        Ok(items
            .iter()
            .filter(|item| self.filter.iter().all(|p| p.matches(item)))
            .map(|item| self.reshape(item))
            .collect())
    }

    fn reshape(&self, item: &Value) -> Value {
        if self.map.is_empty() {
            return item.clone();
        }

        let mut shaped = match item {
            Value::Object(fields) => fields.clone(),
            _ => Map::new(),
        };
        for (target, path) in &self.map {
            if let Some(value) = lookup(item, path) {
                shaped.insert(target.clone(), value.clone());
            }
        }
        Value::Object(shaped)
    }
}

fn select_items<'a>(data: &'a Value, path: &str) -> TrackerResult<&'a Vec<Value>> {
    lookup(data, path).and_then(Value::as_array).ok_or_else(|| {
        let shown = if path.is_empty() { "<root>" } else { path };
        TrackerError::Transform(format!("path '{}' did not resolve to an array", shown))
    })
}
