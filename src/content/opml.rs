//! OPML page variant: a list of discoverable feed URLs

use crate::content::{ContentPage, Properties};
use crate::feeds::reader::FeedReader;

/// One fetched OPML document. `<outline>` elements are flattened into a
/// list of feed URLs.
pub struct OpmlPage {
    url: String,
    contents: String,
    title: Option<String>,
    feed_urls: Vec<String>,
}

impl OpmlPage {
    pub fn new(url: &str, contents: &str) -> Self {
        let (title, feed_urls) = parse_outlines(contents);
        Self {
            url: url.to_string(),
            contents: contents.to_string(),
            title,
            feed_urls,
        }
    }

    /// Feed URLs discovered from outline elements.
    pub fn feed_urls(&self) -> Vec<String> {
        self.feed_urls.clone()
    }
}

impl ContentPage for OpmlPage {
    fn url(&self) -> &str {
        &self.url
    }

    fn contents(&self) -> &str {
        &self.contents
    }

    fn is_valid(&self) -> bool {
        !self.feed_urls.is_empty() || self.contents.to_lowercase().contains("<opml")
    }

    fn title(&self) -> Option<String> {
        self.title.clone()
    }

    fn body_text(&self) -> String {
        self.feed_urls.join("\n")
    }

    fn extend_properties(&self, props: &mut Properties) {
        use serde_json::Value;
        props.insert(
            "rss_urls".into(),
            Value::Array(
                self.feed_urls
                    .iter()
                    .cloned()
                    .map(Value::String)
                    .collect(),
            ),
        );
    }
}

/// Walk the recovered XML tree collecting `xmlUrl` attributes of outline
/// elements, plus the document title.
fn parse_outlines(contents: &str) -> (Option<String>, Vec<String>) {
    let reader = FeedReader::parse(contents);

    let mut titles = Vec::new();
    reader.root_element().descendants_local("title", &mut titles);
    let title = titles.iter().find_map(|t| t.text_value());

    let mut urls = Vec::new();
    let mut outlines = Vec::new();
    reader.root_element().descendants_local("outline", &mut outlines);
    for outline in outlines {
        if let Some(url) = outline.attr("xmlurl").filter(|u| !u.is_empty()) {
            urls.push(url.to_string());
        }
    }
    (title, urls)
}
