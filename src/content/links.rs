//! Outbound link extraction from arbitrary markup
//!
//! Three extraction passes are merged by set union: an `href`-attribute
//! scan, a bare-URL scan, and an HTML-entity-escaped URL scan. They catch
//! different malformed-markup cases (entity-escaped URLs, `href` without
//! quotes) and none alone is complete.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;
use url::Url;

use crate::location::UrlLocation;

fn href_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"href\s*=\s*["']?([^"'\s>]+)"#).expect("Invalid regex pattern")
    })
}

fn bare_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"https?://[^\s"'<>\\]+"#).expect("Invalid regex pattern"))
}

fn escaped_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"https?:&#x2[Ff];&#x2[Ff];[^\s"'<>]+"#).expect("Invalid regex pattern")
    })
}

/// Schemes that look like links but are not fetchable web resources.
const REJECTED_SCHEMES: &[&str] = &["mailto:", "tel:", "sms:", "javascript:", "data:"];

/// Punctuation commonly glued onto URLs by surrounding prose.
const TRAILING_JUNK: &[char] = &['.', ',', ';', ')', ']', '"', '\'', '>', ':'];

/// Extracts and normalizes outbound links from one document.
pub struct ContentLinkParser {
    url: String,
    contents: String,
}

impl ContentLinkParser {
    pub fn new(url: &str, contents: &str) -> Self {
        Self {
            url: url.to_string(),
            contents: contents.to_string(),
        }
    }

    /// All surviving links, deduplicated and sorted.
    pub fn links(&self) -> Vec<String> {
        let mut found = BTreeSet::new();

        for cap in href_re().captures_iter(&self.contents) {
            if let Some(m) = cap.get(1) {
                if let Some(link) = self.normalize(m.as_str()) {
                    found.insert(link);
                }
            }
        }

        for m in bare_url_re().find_iter(&self.contents) {
            if let Some(link) = self.normalize(m.as_str()) {
                found.insert(link);
            }
        }

        for m in escaped_url_re().find_iter(&self.contents) {
            if let Some(link) = self.normalize(m.as_str()) {
                found.insert(link);
            }
        }

        found.into_iter().collect()
    }

    /// Links on the same domain as the page.
    pub fn links_inner(&self) -> Vec<String> {
        let own = UrlLocation::new(&self.url).get_domain_only();
        self.links()
            .into_iter()
            .filter(|l| UrlLocation::new(l).get_domain_only() == own)
            .collect()
    }

    /// Links pointing off the page's domain.
    pub fn links_outer(&self) -> Vec<String> {
        let own = UrlLocation::new(&self.url).get_domain_only();
        self.links()
            .into_iter()
            .filter(|l| UrlLocation::new(l).get_domain_only() != own)
            .collect()
    }

    /// Every surviving link reduced to its domain value, deduplicated.
    pub fn domains(&self) -> Vec<String> {
        let mut domains = BTreeSet::new();
        for link in self.links() {
            if let Some(domain) = UrlLocation::new(&link).get_domain() {
                domains.insert(domain);
            }
        }
        domains.into_iter().collect()
    }

    /// Normalize one raw candidate into a fetchable absolute link.
    fn normalize(&self, raw: &str) -> Option<String> {
        let decoded = html_escape::decode_html_entities(raw);
        let trimmed = decoded.trim().trim_end_matches(TRAILING_JUNK);
        if trimmed.is_empty() || trimmed == "/" || trimmed.starts_with('#') {
            return None;
        }

        let lower = trimmed.to_lowercase();
        if REJECTED_SCHEMES.iter().any(|s| lower.starts_with(s)) {
            return None;
        }

        let absolute = if trimmed.starts_with("//") {
            format!("https:{trimmed}")
        } else if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            // Relative link: resolve against the page URL.
            let base = Url::parse(&self.url).ok()?;
            base.join(trimmed).ok()?.to_string()
        };

        let location = UrlLocation::new(&absolute);
        if !location.is_web_link() {
            return None;
        }
        Some(location.as_str().to_string())
    }
}
