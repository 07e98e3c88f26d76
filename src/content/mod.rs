//! Content classification and property extraction
//!
//! Every fetched document is classified into exactly one [`Page`] variant
//! (HTML, RSS/Atom, JSON, XML, OPML, or opaque Default) and exposed through
//! one uniform accessor contract. Classification is total: any byte string
//! ends up as *some* variant, accessors never panic, and missing facts are
//! `None` rather than errors.

pub mod default;
pub mod factory;
pub mod html;
pub mod json;
pub mod links;
pub mod opml;
pub mod rss;
pub mod xml;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

pub use default::DefaultPage;
pub use factory::PageFactory;
pub use html::HtmlPage;
pub use json::JsonPage;
pub use links::ContentLinkParser;
pub use opml::OpmlPage;
pub use rss::RssPage;
pub use xml::XmlPage;

/// Flat property map, the engine's primary output.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// SHA-256 of arbitrary text, hex encoded.
pub fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// The uniform contract every page variant implements.
pub trait ContentPage {
    fn url(&self) -> &str;
    fn contents(&self) -> &str;

    /// Variant-specific sniff test. A page may be produced even when this
    /// is false (the Default variant never fails it).
    fn is_valid(&self) -> bool;

    fn title(&self) -> Option<String> {
        None
    }
    fn description(&self) -> Option<String> {
        None
    }
    fn author(&self) -> Option<String> {
        None
    }
    fn album(&self) -> Option<String> {
        None
    }
    fn thumbnail(&self) -> Option<String> {
        None
    }
    fn language(&self) -> Option<String> {
        None
    }
    fn tags(&self) -> Vec<String> {
        Vec::new()
    }
    fn date_published(&self) -> Option<DateTime<Utc>> {
        None
    }
    fn canonical_link(&self) -> Option<String> {
        None
    }

    /// Semantically meaningful text used for the body hash, as opposed to
    /// the whole raw document.
    fn body_text(&self) -> String {
        self.contents().to_string()
    }

    /// Variant extras merged into [`ContentPage::properties`].
    fn extend_properties(&self, _props: &mut Properties) {}

    /// `[earned, max]` pairs scored per signal present.
    fn page_rating_vector(&self) -> Vec<(u32, u32)> {
        let score = |present: bool, weight: u32| if present { weight } else { 0 };
        vec![
            (score(self.title().is_some(), 10), 10),
            (score(self.description().is_some(), 5), 5),
            (score(self.date_published().is_some(), 5), 5),
            (score(self.thumbnail().is_some(), 3), 3),
            (score(self.language().is_some(), 2), 2),
            (score(self.author().is_some(), 2), 2),
            (score(!self.tags().is_empty(), 3), 3),
        ]
    }

    /// Aggregate rating, 0-100.
    fn page_rating(&self) -> u32 {
        let vector = self.page_rating_vector();
        let earned: u32 = vector.iter().map(|(e, _)| e).sum();
        let max: u32 = vector.iter().map(|(_, m)| m).sum();
        if max == 0 {
            0
        } else {
            earned * 100 / max
        }
    }

    /// Hash of the whole raw document.
    fn contents_hash(&self) -> String {
        hash_text(self.contents())
    }

    /// Hash of the extracted semantic body.
    fn contents_body_hash(&self) -> String {
        hash_text(&self.body_text())
    }

    /// Flatten every known fact into one property map.
    fn properties(&self) -> Properties {
        use serde_json::Value;

        let mut props = Properties::new();
        props.insert("link".into(), Value::String(self.url().to_string()));
        insert_opt(&mut props, "title", self.title());
        insert_opt(&mut props, "description", self.description());
        insert_opt(&mut props, "author", self.author());
        insert_opt(&mut props, "album", self.album());
        insert_opt(&mut props, "thumbnail", self.thumbnail());
        insert_opt(&mut props, "language", self.language());
        props.insert("page_rating".into(), Value::from(self.page_rating()));

        // Any extractable signal guarantees a publish date; a guessed date
        // in the future is clamped to now.
        let has_signal = self.title().is_some() || self.description().is_some();
        let date = self
            .date_published()
            .map(crate::utils::dates::clamp_to_now)
            .or_else(|| has_signal.then(Utc::now));
        insert_opt(&mut props, "date_published", date.map(|d| d.to_rfc3339()));

        props.insert(
            "tags".into(),
            Value::Array(self.tags().into_iter().map(Value::String).collect()),
        );
        insert_opt(&mut props, "link_canonical", self.canonical_link());
        props.insert(
            "contents".into(),
            Value::String(self.contents().to_string()),
        );
        self.extend_properties(&mut props);
        props
    }
}

fn insert_opt(props: &mut Properties, key: &str, value: Option<String>) {
    if let Some(v) = value {
        if !v.is_empty() {
            props.insert(key.to_string(), serde_json::Value::String(v));
        }
    }
}

/// A classified document, tagged by kind. Exactly one variant per page.
pub enum Page {
    Html(HtmlPage),
    Rss(RssPage),
    Json(JsonPage),
    Xml(XmlPage),
    Opml(OpmlPage),
    Default(DefaultPage),
}

macro_rules! delegate {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        match $self {
            Page::Html(p) => p.$method($($arg),*),
            Page::Rss(p) => p.$method($($arg),*),
            Page::Json(p) => p.$method($($arg),*),
            Page::Xml(p) => p.$method($($arg),*),
            Page::Opml(p) => p.$method($($arg),*),
            Page::Default(p) => p.$method($($arg),*),
        }
    };
}

impl Page {
    /// Document kind tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Page::Html(_) => "html",
            Page::Rss(_) => "rss",
            Page::Json(_) => "json",
            Page::Xml(_) => "xml",
            Page::Opml(_) => "opml",
            Page::Default(_) => "default",
        }
    }

    /// Feed URLs discoverable from this document (autodiscovery links for
    /// HTML, outline URLs for OPML, the page itself for a feed).
    pub fn feeds(&self) -> Vec<String> {
        match self {
            Page::Html(p) => p.rss_urls(),
            Page::Opml(p) => p.feed_urls(),
            Page::Rss(p) => vec![p.url().to_string()],
            _ => Vec::new(),
        }
    }
}

impl ContentPage for Page {
    fn url(&self) -> &str {
        delegate!(self, url)
    }
    fn contents(&self) -> &str {
        delegate!(self, contents)
    }
    fn is_valid(&self) -> bool {
        delegate!(self, is_valid)
    }
    fn title(&self) -> Option<String> {
        delegate!(self, title)
    }
    fn description(&self) -> Option<String> {
        delegate!(self, description)
    }
    fn author(&self) -> Option<String> {
        delegate!(self, author)
    }
    fn album(&self) -> Option<String> {
        delegate!(self, album)
    }
    fn thumbnail(&self) -> Option<String> {
        delegate!(self, thumbnail)
    }
    fn language(&self) -> Option<String> {
        delegate!(self, language)
    }
    fn tags(&self) -> Vec<String> {
        delegate!(self, tags)
    }
    fn date_published(&self) -> Option<DateTime<Utc>> {
        delegate!(self, date_published)
    }
    fn canonical_link(&self) -> Option<String> {
        delegate!(self, canonical_link)
    }
    fn body_text(&self) -> String {
        delegate!(self, body_text)
    }
    fn extend_properties(&self, props: &mut Properties) {
        delegate!(self, extend_properties, props)
    }
}
