//! Generic XML page variant

use crate::content::ContentPage;
use crate::feeds::reader::FeedReader;

/// An XML document that is neither a feed nor OPML (sitemaps, arbitrary
/// exports). Only the most generic facts are extracted.
pub struct XmlPage {
    url: String,
    contents: String,
    title: Option<String>,
}

impl XmlPage {
    pub fn new(url: &str, contents: &str) -> Self {
        let reader = FeedReader::parse(contents);
        let mut titles = Vec::new();
        reader.root_element().descendants_local("title", &mut titles);
        let title = titles.iter().find_map(|t| t.text_value());

        Self {
            url: url.to_string(),
            contents: contents.to_string(),
            title,
        }
    }
}

impl ContentPage for XmlPage {
    fn url(&self) -> &str {
        &self.url
    }

    fn contents(&self) -> &str {
        &self.contents
    }

    fn is_valid(&self) -> bool {
        let trimmed = self.contents.trim_start();
        trimmed.starts_with("<?xml") || (trimmed.starts_with('<') && trimmed.contains("</"))
    }

    fn title(&self) -> Option<String> {
        self.title.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_declaration_valid() {
        let page = XmlPage::new(
            "https://example.com/data.xml",
            r#"<?xml version="1.0"?><root><title>Data</title></root>"#,
        );
        assert!(page.is_valid());
        assert_eq!(page.title().as_deref(), Some("Data"));
    }

    #[test]
    fn test_plain_text_invalid() {
        let page = XmlPage::new("https://example.com/x", "plain words only");
        assert!(!page.is_valid());
    }
}
