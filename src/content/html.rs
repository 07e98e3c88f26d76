//! HTML page classification and metadata extraction
//!
//! Field extraction walks a fixed priority: Open Graph tags, then
//! schema.org microdata, then `<meta name=...>` tags, then raw `<head>`
//! elements. First non-empty value wins. Extraction happens once at
//! construction; the page keeps only plain strings afterwards.

use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use url::Url;

use crate::content::links::ContentLinkParser;
use crate::content::{ContentPage, Properties};
use crate::utils::dates::guess_date;
use crate::utils::normalize_whitespace;

/// Extracted facts of one HTML document.
#[derive(Debug, Clone, Default)]
struct HtmlMeta {
    head_title: Option<String>,
    og: BTreeMap<String, String>,
    named: BTreeMap<String, String>,
    itemprop: BTreeMap<String, String>,
    html_lang: Option<String>,
    time_datetime: Option<String>,
    canonical: Option<String>,
    favicons: Vec<String>,
    rss_urls: Vec<String>,
    body_text: String,
}

/// One fetched HTML document.
pub struct HtmlPage {
    url: String,
    contents: String,
    meta: HtmlMeta,
    links: Vec<String>,
    links_inner: Vec<String>,
    links_outer: Vec<String>,
}

impl HtmlPage {
    pub fn new(url: &str, contents: &str) -> Self {
        let meta = extract_meta(url, contents);
        let parser = ContentLinkParser::new(url, contents);
        Self {
            url: url.to_string(),
            contents: contents.to_string(),
            meta,
            links: parser.links(),
            links_inner: parser.links_inner(),
            links_outer: parser.links_outer(),
        }
    }

    /// RSS/Atom autodiscovery URLs declared in the document head.
    pub fn rss_urls(&self) -> Vec<String> {
        self.meta.rss_urls.clone()
    }

    /// Favicon URLs (`rel=icon`, `rel=shortcut icon`).
    pub fn favicons(&self) -> Vec<String> {
        self.meta.favicons.clone()
    }

    /// All outbound links.
    pub fn links(&self) -> Vec<String> {
        self.links.clone()
    }

    /// First non-empty value across the og -> microdata -> meta-name
    /// priority for the given keys.
    fn pick(&self, og: &str, itemprop: &str, named: &str) -> Option<String> {
        self.meta
            .og
            .get(og)
            .or_else(|| self.meta.itemprop.get(itemprop))
            .or_else(|| self.meta.named.get(named))
            .cloned()
            .filter(|v| !v.is_empty())
    }
}

impl ContentPage for HtmlPage {
    fn url(&self) -> &str {
        &self.url
    }

    fn contents(&self) -> &str {
        &self.contents
    }

    fn is_valid(&self) -> bool {
        let lower = self.contents.to_lowercase();
        lower.contains("<html")
            || lower.contains("<!doctype html")
            || lower.contains("<head")
            || lower.contains("<body")
    }

    fn title(&self) -> Option<String> {
        self.pick("og:title", "headline", "title")
            .or_else(|| self.meta.head_title.clone())
    }

    fn description(&self) -> Option<String> {
        self.pick("og:description", "description", "description")
    }

    fn author(&self) -> Option<String> {
        self.pick("article:author", "author", "author")
    }

    fn album(&self) -> Option<String> {
        self.pick("og:music:album", "album", "album")
    }

    fn thumbnail(&self) -> Option<String> {
        self.pick("og:image", "image", "thumbnail")
            .or_else(|| self.meta.favicons.first().cloned())
    }

    fn language(&self) -> Option<String> {
        self.meta
            .html_lang
            .clone()
            .or_else(|| self.pick("og:locale", "inlanguage", "language"))
    }

    fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .meta
            .og
            .get("article:tag")
            .into_iter()
            .map(|t| t.to_string())
            .collect();
        if let Some(keywords) = self.meta.named.get("keywords") {
            tags.extend(
                keywords
                    .split(',')
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty()),
            );
        }
        tags.dedup();
        tags
    }

    fn date_published(&self) -> Option<DateTime<Utc>> {
        let raw = self
            .meta
            .og
            .get("article:published_time")
            .or_else(|| self.meta.itemprop.get("datepublished"))
            .or_else(|| self.meta.named.get("date"))
            .cloned()
            .or_else(|| self.meta.time_datetime.clone())?;
        guess_date(&raw)
    }

    fn canonical_link(&self) -> Option<String> {
        self.meta
            .canonical
            .clone()
            .or_else(|| self.meta.og.get("og:url").cloned())
    }

    fn body_text(&self) -> String {
        self.meta.body_text.clone()
    }

    fn extend_properties(&self, props: &mut Properties) {
        use serde_json::Value;

        let string_list = |items: &[String]| {
            Value::Array(items.iter().cloned().map(Value::String).collect())
        };

        if let Some(t) = &self.meta.head_title {
            props.insert("meta_title".into(), Value::String(t.clone()));
        }
        if let Some(t) = self.meta.og.get("og:title") {
            props.insert("og_title".into(), Value::String(t.clone()));
        }
        if let Some(d) = self.meta.og.get("og:description") {
            props.insert("og_description".into(), Value::String(d.clone()));
        }
        if let Some(i) = self.meta.og.get("og:image") {
            props.insert("og_image".into(), Value::String(i.clone()));
        }
        props.insert("favicons".into(), string_list(&self.meta.favicons));
        props.insert("links".into(), string_list(&self.links));
        props.insert("links_inner".into(), string_list(&self.links_inner));
        props.insert("links_outer".into(), string_list(&self.links_outer));
        props.insert("rss_urls".into(), string_list(&self.meta.rss_urls));
    }
}

fn selector(rule: &str) -> Selector {
    Selector::parse(rule).expect("Invalid selector")
}

/// Resolve a possibly relative href against the page URL.
fn resolve(page_url: &str, href: &str) -> Option<String> {
    if href.is_empty() {
        return None;
    }
    if href.starts_with("//") {
        return Some(format!("https:{href}"));
    }
    if href.contains("://") {
        return Some(href.to_string());
    }
    let base = Url::parse(page_url).ok()?;
    Some(base.join(href).ok()?.to_string())
}

fn extract_meta(url: &str, contents: &str) -> HtmlMeta {
    let document = Html::parse_document(contents);
    let mut meta = HtmlMeta::default();

    if let Some(el) = document.select(&selector("html")).next() {
        meta.html_lang = el.value().attr("lang").map(str::to_string);
    }

    if let Some(el) = document.select(&selector("head > title, title")).next() {
        let text = normalize_whitespace(&el.text().collect::<String>());
        if !text.is_empty() {
            meta.head_title = Some(text);
        }
    }

    for el in document.select(&selector("meta")) {
        let value = el.value();
        let content = match value.attr("content") {
            Some(c) if !c.trim().is_empty() => c.trim().to_string(),
            _ => continue,
        };
        if let Some(property) = value.attr("property") {
            meta.og
                .entry(property.trim().to_lowercase())
                .or_insert(content.clone());
        }
        if let Some(name) = value.attr("name") {
            meta.named
                .entry(name.trim().to_lowercase())
                .or_insert(content.clone());
        }
        if let Some(itemprop) = value.attr("itemprop") {
            meta.itemprop
                .entry(itemprop.trim().to_lowercase())
                .or_insert(content);
        }
    }

    // Microdata also rides on non-meta elements (content/datetime attrs).
    for el in document.select(&selector("[itemprop]")) {
        let value = el.value();
        let Some(prop) = value.attr("itemprop") else {
            continue;
        };
        let extracted = value
            .attr("content")
            .or_else(|| value.attr("datetime"))
            .or_else(|| value.attr("src"))
            .map(str::to_string);
        if let Some(extracted) = extracted {
            meta.itemprop
                .entry(prop.trim().to_lowercase())
                .or_insert(extracted);
        }
    }

    for el in document.select(&selector("link[rel]")) {
        let value = el.value();
        let rel = value.attr("rel").unwrap_or_default().to_lowercase();
        let href = value.attr("href").unwrap_or_default();
        let Some(resolved) = resolve(url, href) else {
            continue;
        };
        if rel == "canonical" {
            meta.canonical.get_or_insert(resolved);
        } else if rel.split_whitespace().any(|r| r == "icon") {
            meta.favicons.push(resolved);
        } else if rel == "alternate" {
            let kind = value.attr("type").unwrap_or_default().to_lowercase();
            if kind.contains("rss+xml") || kind.contains("atom+xml") {
                meta.rss_urls.push(resolved);
            }
        }
    }

    if let Some(el) = document.select(&selector("time[datetime]")).next() {
        meta.time_datetime = el.value().attr("datetime").map(str::to_string);
    }

    if let Some(body) = document.select(&selector("body")).next() {
        meta.body_text = normalize_whitespace(&body.text().collect::<Vec<_>>().join(" "));
    }

    meta
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <title>Head Title</title>
  <meta property="og:title" content="OG Title"/>
  <meta property="og:description" content="OG description"/>
  <meta property="og:image" content="https://example.com/og.png"/>
  <meta property="article:published_time" content="2024-01-09T10:00:00Z"/>
  <meta name="author" content="A. Writer"/>
  <meta name="keywords" content="alpha, beta"/>
  <link rel="canonical" href="https://example.com/canonical"/>
  <link rel="icon" href="/favicon.ico"/>
  <link rel="shortcut icon" href="/favicon-32.png"/>
  <link rel="alternate" type="application/rss+xml" href="/feed.xml"/>
</head>
<body>
  <p>Hello world. <a href="https://other.org/x">link</a></p>
</body>
</html>"#;

    fn page() -> HtmlPage {
        HtmlPage::new("https://example.com/post", DOC)
    }

    #[test]
    fn test_og_priority_over_head_title() {
        assert_eq!(page().title().as_deref(), Some("OG Title"));
    }

    #[test]
    fn test_head_title_fallback() {
        let doc = "<html><head><title>Only Title</title></head><body></body></html>";
        let page = HtmlPage::new("https://example.com/", doc);
        assert_eq!(page.title().as_deref(), Some("Only Title"));
    }

    #[test]
    fn test_description_author_language() {
        let p = page();
        assert_eq!(p.description().as_deref(), Some("OG description"));
        assert_eq!(p.author().as_deref(), Some("A. Writer"));
        assert_eq!(p.language().as_deref(), Some("en"));
    }

    #[test]
    fn test_thumbnail_and_favicons() {
        let p = page();
        assert_eq!(p.thumbnail().as_deref(), Some("https://example.com/og.png"));
        assert_eq!(
            p.favicons(),
            vec![
                "https://example.com/favicon.ico".to_string(),
                "https://example.com/favicon-32.png".to_string(),
            ]
        );
    }

    #[test]
    fn test_canonical_and_rss_discovery() {
        let p = page();
        assert_eq!(
            p.canonical_link().as_deref(),
            Some("https://example.com/canonical")
        );
        assert_eq!(p.rss_urls(), vec!["https://example.com/feed.xml"]);
    }

    #[test]
    fn test_date_published() {
        use chrono::Datelike;
        let date = page().date_published().unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2024, 1, 9));
    }

    #[test]
    fn test_tags_from_keywords() {
        assert_eq!(page().tags(), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_microdata_fallback() {
        let doc = r#"<html><head>
<meta itemprop="headline" content="Schema Title"/>
<span itemprop="datePublished" content="2024-01-09"></span>
</head><body></body></html>"#;
        let page = HtmlPage::new("https://example.com/", doc);
        assert_eq!(page.title().as_deref(), Some("Schema Title"));
        assert!(page.date_published().is_some());
    }

    #[test]
    fn test_is_valid_sniff() {
        assert!(page().is_valid());
        let not_html = HtmlPage::new("https://example.com/", "just words");
        assert!(!not_html.is_valid());
    }

    #[test]
    fn test_extend_properties_extras() {
        use crate::content::ContentPage;
        let props = page().properties();
        assert_eq!(props["og_title"], "OG Title");
        assert_eq!(props["meta_title"], "Head Title");
        assert!(props["links"].as_array().unwrap().iter().any(|v| v
            .as_str()
            .unwrap()
            .contains("other.org")));
        assert!(props.contains_key("rss_urls"));
    }

    #[test]
    fn test_body_text_hash_differs_from_contents_hash() {
        let p = page();
        assert_ne!(p.contents_hash(), p.contents_body_hash());
    }
}
