use serde_json::Value;

/// One upstream record before normalization, as a JSON object.
pub type RawItem = Value;

/// Look up `path` in `item`.
///
/// An exact key match wins (so keys such as `content:encoded` work), otherwise
/// the path is walked segment by segment on `.`, with numeric segments
/// indexing arrays. An empty path is the item itself. Null counts as absent.
pub fn lookup<'a>(item: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(item).filter(|v| !v.is_null());
    }

    let found = match item.get(path) {
        Some(value) => Some(value),
        None => path.split('.').try_fold(item, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }),
    };

    found.filter(|v| !v.is_null())
}

/// The primary field when present, else the fallback field, else nothing.
pub fn resolve_field<'a>(item: &'a Value, primary: &str, fallback: Option<&str>) -> Option<&'a Value> {
    lookup(item, primary).or_else(|| fallback.and_then(|path| lookup(item, path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primary_field_wins() {
        let item = json!({ "name": "v1.0", "tag_name": "1.0.0" });
        assert_eq!(resolve_field(&item, "name", Some("tag_name")), Some(&json!("v1.0")));
    }

    #[test]
    fn test_fallback_on_missing_or_null() {
        let item = json!({ "name": null, "tag_name": "1.0.0" });
        assert_eq!(resolve_field(&item, "name", Some("tag_name")), Some(&json!("1.0.0")));
        assert_eq!(resolve_field(&item, "title", Some("tag_name")), Some(&json!("1.0.0")));
    }

    #[test]
    fn test_absent_without_fallback() {
        let item = json!({ "title": "x" });
        assert_eq!(resolve_field(&item, "link", None), None);
        assert_eq!(resolve_field(&item, "link", Some("url")), None);
    }

    #[test]
    fn test_no_coercion() {
        let item = json!({ "count": 0, "flag": false, "empty": "" });
        assert_eq!(resolve_field(&item, "count", None), Some(&json!(0)));
        assert_eq!(resolve_field(&item, "flag", None), Some(&json!(false)));
        assert_eq!(resolve_field(&item, "empty", Some("count")), Some(&json!("")));
    }

    #[test]
    fn test_exact_key_with_special_characters() {
        let item = json!({ "content:encoded": "<p>full</p>" });
        assert_eq!(lookup(&item, "content:encoded"), Some(&json!("<p>full</p>")));
    }

    #[test]
    fn test_dotted_paths() {
        let item = json!({ "data": { "posts": [{ "title": "first" }, { "title": "second" }] } });
        assert_eq!(lookup(&item, "data.posts.1.title"), Some(&json!("second")));
        assert_eq!(lookup(&item, "data.posts.5.title"), None);
        assert_eq!(lookup(&item, "data.missing"), None);
        assert_eq!(lookup(&item, ""), Some(&item));
    }
}
