//! Shared fixtures for integration tests

use lodestone::config::Config;

/// Config tuned for fast offline tests: high rate limit, short timeouts,
/// two rate-limit attempts.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.crawler.rate_limit = 100;
    config.crawler.rate_limit_attempts = 2;
    config.crawler.request_timeout_secs = 5;
    config
}

pub const SAMPLE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <title>Sample Head Title</title>
  <meta property="og:title" content="Sample OG Title"/>
  <meta property="og:description" content="A sample description"/>
  <meta property="og:image" content="https://sample.test/og.png"/>
  <meta property="article:published_time" content="2024-01-09T10:00:00Z"/>
  <meta name="author" content="Sample Author"/>
  <meta name="keywords" content="one, two"/>
  <link rel="canonical" href="https://sample.test/canonical"/>
  <link rel="icon" href="/favicon.ico"/>
  <link rel="alternate" type="application/rss+xml" href="/feed.xml"/>
</head>
<body>
  <p>Body text with <a href="https://elsewhere.test/page">a link</a>
  and <a href="/inner">an inner link</a>.</p>
</body>
</html>"#;

pub const SAMPLE_FEED: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
  <title>Sample Feed</title>
  <description>Sample feed description</description>
  <language>en</language>
  <pubDate>Tue, 09 Jan 2024 10:00:00 GMT</pubDate>
  <item>
    <title>Entry One</title>
    <link>https://sample.test/one</link>
    <pubDate>Mon, 08 Jan 2024 09:00:00 GMT</pubDate>
  </item>
  <item>
    <title>Entry Two</title>
    <link>https://sample.test/two</link>
  </item>
</channel></rss>"#;

pub const SAMPLE_ROBOTS: &str = "\
User-agent: *\n\
Disallow: /private/\n\
Allow: /private/open/\n\
Sitemap: https://sample.test/sitemap.xml\n";
