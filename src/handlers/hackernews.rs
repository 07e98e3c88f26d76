//! Hacker News recognizer

use url::Url;

use crate::location::UrlLocation;

/// Recognize a Hacker News URL. Returns `(canonical_url, item_id)`; the
/// front page resolves with an empty code.
pub(crate) fn probe(url: &str) -> Option<(String, String)> {
    let location = UrlLocation::new(url);
    let host = location.get_domain_only()?;
    if host != "news.ycombinator.com" {
        return None;
    }

    let parsed = Url::parse(location.as_str()).ok()?;
    if parsed.path() == "/item" {
        let id = parsed
            .query_pairs()
            .find(|(k, _)| k == "id")
            .map(|(_, v)| v.into_owned())?;
        return Some((format!("https://news.ycombinator.com/item?id={id}"), id));
    }

    Some((String::from("https://news.ycombinator.com"), String::new()))
}

/// Comment feed for an item, front-page feed otherwise.
pub(crate) fn feeds(code: &str) -> Vec<String> {
    if code.is_empty() {
        vec![String::from("https://news.ycombinator.com/rss")]
    } else {
        vec![format!("https://hnrss.org/item?id={code}")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item() {
        let (canonical, code) =
            probe("https://news.ycombinator.com/item?id=39210000").unwrap();
        assert_eq!(code, "39210000");
        assert_eq!(canonical, "https://news.ycombinator.com/item?id=39210000");
        assert_eq!(feeds(&code), vec!["https://hnrss.org/item?id=39210000"]);
    }

    #[test]
    fn test_front_page() {
        let (canonical, code) = probe("https://news.ycombinator.com/").unwrap();
        assert_eq!(canonical, "https://news.ycombinator.com");
        assert!(code.is_empty());
        assert_eq!(feeds(&code), vec!["https://news.ycombinator.com/rss"]);
    }

    #[test]
    fn test_rejects_other_hosts() {
        assert!(probe("https://example.com/item?id=1").is_none());
    }
}
