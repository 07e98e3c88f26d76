//! Content-type sniffing and ordered fallback across page variants
//!
//! The declared content-type picks a family-specific probe order; the first
//! variant whose `is_valid()` accepts the document wins. When the declared
//! family matched nothing, an ultimate fallback chain runs, ending in the
//! opaque Default variant. Classification never fails for text-like
//! responses; binary families yield no page at all.

use tracing::debug;

use crate::content::{
    ContentPage, DefaultPage, HtmlPage, JsonPage, OpmlPage, Page, RssPage, XmlPage,
};

/// Content-type prefixes that carry no extractable text.
const BINARY_MARKERS: &[&str] = &[
    "image/",
    "audio/",
    "video/",
    "font/",
    "application/octet-stream",
    "application/pdf",
    "application/zip",
    "application/gzip",
];

/// Declared content-type family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Html,
    Rss,
    Json,
    Binary,
    Other,
}

/// Probe targets, tried in family-specific order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    Html,
    Rss,
    Opml,
    Xml,
    Json,
}

pub struct PageFactory;

impl PageFactory {
    /// Classify one document. Returns `None` only for binary content
    /// types; any text-like input yields a page, worst case the opaque
    /// Default variant.
    pub fn get(url: &str, content_type: Option<&str>, contents: &str) -> Option<Page> {
        let family = sniff_family(content_type);
        debug!(url = %url, family = ?family, "classifying response");

        let probes: &[Probe] = match family {
            Family::Binary => return None,
            Family::Html => &[Probe::Html, Probe::Rss, Probe::Opml, Probe::Json],
            Family::Rss => &[Probe::Rss, Probe::Opml, Probe::Xml, Probe::Html, Probe::Json],
            Family::Json => &[Probe::Json, Probe::Html, Probe::Rss, Probe::Opml],
            Family::Other => &[],
        };

        for probe in probes {
            if let Some(page) = try_probe(*probe, url, contents) {
                return Some(page);
            }
        }

        // Ultimate fallback: declared family matched nothing (or the type
        // was unrecognized).
        for probe in [Probe::Html, Probe::Rss, Probe::Opml, Probe::Json] {
            if let Some(page) = try_probe(probe, url, contents) {
                return Some(page);
            }
        }

        Some(Page::Default(DefaultPage::new(url, contents)))
    }
}

fn try_probe(probe: Probe, url: &str, contents: &str) -> Option<Page> {
    let page = match probe {
        Probe::Html => Page::Html(HtmlPage::new(url, contents)),
        Probe::Rss => Page::Rss(RssPage::new(url, contents)),
        Probe::Opml => Page::Opml(OpmlPage::new(url, contents)),
        Probe::Xml => Page::Xml(XmlPage::new(url, contents)),
        Probe::Json => Page::Json(JsonPage::new(url, contents)),
    };
    if page.is_valid() {
        Some(page)
    } else {
        None
    }
}

fn sniff_family(content_type: Option<&str>) -> Family {
    let Some(ct) = content_type else {
        return Family::Other;
    };
    let ct = ct.to_lowercase();

    if BINARY_MARKERS.iter().any(|m| ct.starts_with(m)) {
        return Family::Binary;
    }
    if ct.contains("html") {
        return Family::Html;
    }
    if ct.contains("rss") || ct.contains("atom") || ct.contains("opml") || ct.contains("xml") {
        return Family::Rss;
    }
    if ct.contains("json") {
        return Family::Json;
    }
    Family::Other
}
