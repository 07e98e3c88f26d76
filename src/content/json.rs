//! JSON page variant

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::content::ContentPage;
use crate::utils::dates::guess_date;

/// One fetched JSON document.
///
/// Only a flat top-level object is accepted as page metadata: a document
/// whose top-level values are themselves non-empty objects is some API
/// payload, not a describable page, and fails validation.
pub struct JsonPage {
    url: String,
    contents: String,
    value: Option<Value>,
}

impl JsonPage {
    pub fn new(url: &str, contents: &str) -> Self {
        Self {
            url: url.to_string(),
            contents: contents.to_string(),
            value: serde_json::from_str(contents).ok(),
        }
    }

    fn field(&self, keys: &[&str]) -> Option<String> {
        let obj = self.value.as_ref()?.as_object()?;
        for key in keys {
            if let Some(text) = obj.get(*key).and_then(Value::as_str) {
                if !text.is_empty() {
                    return Some(text.to_string());
                }
            }
        }
        None
    }
}

impl ContentPage for JsonPage {
    fn url(&self) -> &str {
        &self.url
    }

    fn contents(&self) -> &str {
        &self.contents
    }

    fn is_valid(&self) -> bool {
        let Some(obj) = self.value.as_ref().and_then(Value::as_object) else {
            return false;
        };
        obj.values().all(|v| match v {
            Value::Object(inner) => inner.is_empty(),
            _ => true,
        })
    }

    fn title(&self) -> Option<String> {
        self.field(&["title", "name"])
    }

    fn description(&self) -> Option<String> {
        self.field(&["description", "summary"])
    }

    fn author(&self) -> Option<String> {
        self.field(&["author"])
    }

    fn thumbnail(&self) -> Option<String> {
        self.field(&["thumbnail", "image", "icon"])
    }

    fn language(&self) -> Option<String> {
        self.field(&["language", "lang"])
    }

    fn tags(&self) -> Vec<String> {
        let Some(obj) = self.value.as_ref().and_then(Value::as_object) else {
            return Vec::new();
        };
        obj.get("tags")
            .or_else(|| obj.get("keywords"))
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn date_published(&self) -> Option<DateTime<Utc>> {
        self.field(&["date_published", "published", "date"])
            .as_deref()
            .and_then(guess_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_object_valid() {
        let page = JsonPage::new(
            "https://example.com/meta.json",
            r#"{"title": "T", "description": "D", "tags": ["a", "b"]}"#,
        );
        assert!(page.is_valid());
        assert_eq!(page.title().as_deref(), Some("T"));
        assert_eq!(page.tags(), vec!["a", "b"]);
    }

    #[test]
    fn test_nested_object_rejected() {
        let page = JsonPage::new(
            "https://example.com/api.json",
            r#"{"data": {"rows": [1, 2, 3]}}"#,
        );
        assert!(!page.is_valid());
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(!JsonPage::new("https://example.com/x", "[1,2,3]").is_valid());
        assert!(!JsonPage::new("https://example.com/x", "not json").is_valid());
        assert!(!JsonPage::new("https://example.com/x", "42").is_valid());
    }

    #[test]
    fn test_accessors_never_panic_on_garbage() {
        let page = JsonPage::new("https://example.com/x", "{broken");
        assert!(page.title().is_none());
        assert!(page.tags().is_empty());
        assert!(page.date_published().is_none());
    }
}
