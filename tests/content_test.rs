//! Integration tests for content classification

mod common;

use common::{SAMPLE_FEED, SAMPLE_HTML};
use lodestone::content::{ContentPage, PageFactory};
use lodestone::feeds::FeedReader;

#[test]
fn test_classification_totality() {
    // For any byte string and any non-binary declared type, the factory
    // yields a page whose accessors never panic.
    let inputs = [
        ("", None),
        ("plain words", Some("text/plain")),
        ("{\"a\": 1}", Some("application/json")),
        ("<html><body>x</body></html>", Some("text/html")),
        ("<rss><channel></channel></rss>", Some("application/rss+xml")),
        ("\u{0}\u{1}garbage", None),
        ("<<<>>>", Some("text/weird")),
    ];

    for (contents, content_type) in inputs {
        let page = PageFactory::get("https://sample.test/x", content_type, contents)
            .unwrap_or_else(|| panic!("no page for {contents:?}"));
        let _ = page.title();
        let _ = page.description();
        let _ = page.date_published();
        let _ = page.page_rating();
        let props = page.properties();
        assert!(props.contains_key("link"));
    }
}

#[test]
fn test_binary_types_decline_extraction() {
    for content_type in ["image/png", "video/mp4", "font/woff2", "application/pdf"] {
        assert!(
            PageFactory::get("https://sample.test/x", Some(content_type), "data").is_none(),
            "{content_type} must not classify"
        );
    }
}

#[test]
fn test_html_properties_end_to_end() {
    let page = PageFactory::get("https://sample.test/post", Some("text/html"), SAMPLE_HTML)
        .unwrap();
    assert_eq!(page.kind(), "html");

    let props = page.properties();
    assert_eq!(props["title"], "Sample OG Title");
    assert_eq!(props["description"], "A sample description");
    assert_eq!(props["author"], "Sample Author");
    assert_eq!(props["language"], "en");
    assert_eq!(props["link_canonical"], "https://sample.test/canonical");
    assert_eq!(props["thumbnail"], "https://sample.test/og.png");

    let rating = props["page_rating"].as_u64().unwrap();
    assert!(rating > 50, "rich page should rate well, got {rating}");

    let inner = props["links_inner"].as_array().unwrap();
    assert!(inner.iter().any(|v| v == "https://sample.test/inner"));
    let outer = props["links_outer"].as_array().unwrap();
    assert!(outer.iter().any(|v| v == "https://elsewhere.test/page"));
}

#[test]
fn test_feed_properties_end_to_end() {
    let page = PageFactory::get(
        "https://sample.test/feed.xml",
        Some("application/rss+xml"),
        SAMPLE_FEED,
    )
    .unwrap();
    assert_eq!(page.kind(), "rss");

    let props = page.properties();
    assert_eq!(props["title"], "Sample Feed");
    let entries = props["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["link"], "https://sample.test/one");
}

#[test]
fn test_feed_link_recovery_at_ordinal() {
    // Entries whose <link/> is empty recover the URL from the raw text of
    // the k-th <item> span.
    let feed = r#"<rss><channel><title>T</title>
<item><title>A</title><link/>https://sample.test/a</item>
<item><title>B</title><link/>https://sample.test/b</item>
<item><title>C</title><link/>https://sample.test/c</item>
</channel></rss>"#;

    let reader = FeedReader::parse(feed);
    let entries = reader.entries();
    assert_eq!(entries.len(), 3);
    for (k, expected) in [
        "https://sample.test/a",
        "https://sample.test/b",
        "https://sample.test/c",
    ]
    .iter()
    .enumerate()
    {
        assert_eq!(entries[k].index(), k);
        assert_eq!(entries[k].link().as_deref(), Some(*expected));
    }
}

#[test]
fn test_date_guessing_properties() {
    use lodestone::utils::dates::guess_date;

    let a = guess_date("Jan. 9 2024").unwrap();
    let b = guess_date("9 jan. 2024").unwrap();
    let c = guess_date("2024-01-09").unwrap();
    assert_eq!(a.date_naive(), b.date_naive());
    assert_eq!(b.date_naive(), c.date_naive());

    let clamped = guess_date("2099-01-01").unwrap();
    assert!(clamped <= chrono::Utc::now());
}

#[test]
fn test_hashes_distinguish_body_from_envelope() {
    let page_a = PageFactory::get(
        "https://sample.test/feed.xml",
        Some("application/rss+xml"),
        SAMPLE_FEED,
    )
    .unwrap();

    // Changing only channel metadata leaves the body hash stable.
    let altered = SAMPLE_FEED.replace("Sample feed description", "Edited description");
    let page_b = PageFactory::get(
        "https://sample.test/feed.xml",
        Some("application/rss+xml"),
        &altered,
    )
    .unwrap();

    assert_ne!(page_a.contents_hash(), page_b.contents_hash());
    assert_eq!(page_a.contents_body_hash(), page_b.contents_body_hash());
}
