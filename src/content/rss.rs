//! RSS/Atom page variant

use chrono::{DateTime, Utc};

use crate::content::{ContentPage, Properties};
use crate::feeds::{FeedEntry, FeedHeader, FeedReader};
use crate::utils::dates::guess_date;

/// One fetched feed document.
pub struct RssPage {
    url: String,
    contents: String,
    header: FeedHeader,
    entries: Vec<FeedEntry>,
}

impl RssPage {
    pub fn new(url: &str, contents: &str) -> Self {
        let reader = FeedReader::parse(contents);
        Self {
            url: url.to_string(),
            contents: contents.to_string(),
            header: reader.header(),
            entries: reader.entries(),
        }
    }

    /// Parsed feed entries, in document order.
    pub fn entries(&self) -> &[FeedEntry] {
        &self.entries
    }

    /// Channel-level header fields.
    pub fn header(&self) -> &FeedHeader {
        &self.header
    }
}

impl ContentPage for RssPage {
    fn url(&self) -> &str {
        &self.url
    }

    fn contents(&self) -> &str {
        &self.contents
    }

    /// A document is a feed when entries parsed, or when the raw text still
    /// carries a bare `<rss`/`<feed` token (headerless or malformed feeds
    /// that still look like feeds).
    fn is_valid(&self) -> bool {
        if !self.entries.is_empty() {
            return true;
        }
        let lower = self.contents.to_lowercase();
        lower.contains("<rss") || lower.contains("<feed")
    }

    fn title(&self) -> Option<String> {
        self.header.title.clone()
    }

    fn description(&self) -> Option<String> {
        self.header
            .description
            .clone()
            .or_else(|| self.header.subtitle.clone())
    }

    fn author(&self) -> Option<String> {
        self.header.author.clone()
    }

    fn thumbnail(&self) -> Option<String> {
        self.header.image.clone()
    }

    fn language(&self) -> Option<String> {
        self.header.language.clone()
    }

    fn tags(&self) -> Vec<String> {
        self.header.tags.clone()
    }

    fn date_published(&self) -> Option<DateTime<Utc>> {
        self.header
            .published
            .as_deref()
            .and_then(guess_date)
            .or_else(|| {
                self.entries
                    .first()
                    .and_then(|e| e.published())
                    .as_deref()
                    .and_then(guess_date)
            })
    }

    /// The semantic body of a feed is its entry list, not the envelope.
    fn body_text(&self) -> String {
        let mut parts = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            parts.push(format!(
                "{}\n{}",
                entry.link().unwrap_or_default(),
                entry.title().unwrap_or_default()
            ));
        }
        parts.join("\n")
    }

    fn extend_properties(&self, props: &mut Properties) {
        use serde_json::{json, Value};

        let entries: Vec<Value> = self
            .entries
            .iter()
            .map(|e| {
                json!({
                    "link": e.link(),
                    "title": e.title(),
                    "description": e.description(),
                    "published": e.published(),
                    "thumbnail": e.thumbnail(),
                })
            })
            .collect();
        props.insert("entries".into(), Value::Array(entries));
    }
}
