//! One RSS/Atom entry, with raw-text fallbacks for unreliable fields

use regex::Regex;
use std::sync::OnceLock;

use crate::feeds::reader::XmlElement;

/// First absolute URL following a `<link` tag in raw text. Catches the
/// `<link/>https://...` pattern where the URL ends up as tail text and the
/// structured parse sees an empty element.
fn link_fallback_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<link[^>]*>\s*(https?://[^<\s"']+)"#).expect("Invalid regex pattern")
    })
}

/// One feed entry.
///
/// Wraps the recovered element plus the raw text span of the Nth
/// `<item>`/`<entry>` occurrence and the entry's ordinal index. The raw
/// span exists because structured `<link>` extraction is unreliable for
/// some real feeds and the link must then be rescued from source text.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    node: XmlElement,
    raw: String,
    index: usize,
}

impl FeedEntry {
    pub(crate) fn new(node: XmlElement, raw: String, index: usize) -> Self {
        Self { node, raw, index }
    }

    /// Ordinal position among the feed's entries.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Raw source-text span of this entry.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Entry link: structured text, then Atom `href` attributes
    /// (preferring `rel="alternate"`), then a raw-text scan of this
    /// entry's span.
    pub fn link(&self) -> Option<String> {
        if let Some(text) = self
            .node
            .child_local("link")
            .and_then(|el| el.text_value())
        {
            return Some(text);
        }

        let links: Vec<&XmlElement> = self.node.children_local("link").collect();
        let by_rel = links
            .iter()
            .find(|el| matches!(el.attr("rel"), None | Some("alternate")))
            .or(links.first());
        if let Some(href) = by_rel.and_then(|el| el.attr("href")) {
            if !href.is_empty() {
                return Some(href.to_string());
            }
        }

        link_fallback_re()
            .captures(&self.raw)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().to_string())
    }

    pub fn title(&self) -> Option<String> {
        self.node.first_text(&["title"])
    }

    /// Description, falling back through the media/content vocabularies.
    pub fn description(&self) -> Option<String> {
        self.node.first_text(&[
            "description",
            "media:description",
            "content",
            "content:encoded",
            "summary",
        ])
    }

    /// Raw published-date text; callers normalize with the date guesser.
    pub fn published(&self) -> Option<String> {
        self.node
            .first_text(&["pubdate", "published", "updated", "dc:date"])
    }

    /// Thumbnail URL from `media:thumbnail`, `media:content`, or an image
    /// enclosure.
    pub fn thumbnail(&self) -> Option<String> {
        if let Some(url) = self
            .node
            .child("media:thumbnail")
            .and_then(|el| el.attr("url"))
        {
            return Some(url.to_string());
        }
        if let Some(url) = self
            .node
            .child("media:content")
            .and_then(|el| el.attr("url"))
        {
            return Some(url.to_string());
        }
        self.node
            .child_local("enclosure")
            .filter(|el| {
                el.attr("type")
                    .map(|t| t.starts_with("image/"))
                    .unwrap_or(false)
            })
            .and_then(|el| el.attr("url"))
            .map(str::to_string)
    }

    /// Author: direct element text, Atom `<author><name>`, or
    /// `itunes:owner/name`.
    pub fn author(&self) -> Option<String> {
        if let Some(text) = self.node.first_text(&["author", "dc:creator"]) {
            return Some(text);
        }
        if let Some(name) = self
            .node
            .child_local("author")
            .and_then(|a| a.child_local("name"))
            .and_then(|n| n.text_value())
        {
            return Some(name);
        }
        self.node
            .child("itunes:owner")
            .and_then(|o| o.child_local("name"))
            .and_then(|n| n.text_value())
    }

    /// Category/tag values (element text or Atom `term` attributes).
    pub fn tags(&self) -> Vec<String> {
        self.node
            .children_local("category")
            .filter_map(|cat| {
                cat.text_value()
                    .or_else(|| cat.attr("term").map(str::to_string))
            })
            .collect()
    }

    /// Optional `<source>` sub-element: its `url` attribute or text.
    pub fn source(&self) -> Option<String> {
        let source = self.node.child_local("source")?;
        source
            .attr("url")
            .map(str::to_string)
            .or_else(|| source.text_value())
    }
}
