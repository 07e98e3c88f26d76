//! Escalation ladder configuration
//!
//! Each fetch carries an ordered list of crawler kinds, cheapest first. A
//! static rule table forces a more capable backend to the front for domains
//! known to require script execution or full rendering.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::location::UrlLocation;

/// The kinds of crawler backend a fetch can escalate through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrawlerKind {
    /// Plain HTTP client
    Http,
    /// Headless browser (script execution, no rendering)
    Headless,
    /// Full browser emulation
    FullBrowser,
}

impl CrawlerKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Headless => "headless",
            Self::FullBrowser => "full-browser",
        }
    }
}

/// Domains that need a specific backend brought to the front of the ladder.
/// Substring match against the host. Extend the table, not the algorithm.
const ESCALATION_RULES: &[(&str, CrawlerKind)] = &[
    ("reddit.com", CrawlerKind::Headless),
    ("twitter.com", CrawlerKind::FullBrowser),
    ("x.com", CrawlerKind::FullBrowser),
    ("medium.com", CrawlerKind::Headless),
    ("bloomberg.com", CrawlerKind::FullBrowser),
    ("linkedin.com", CrawlerKind::FullBrowser),
];

/// Fetch configuration handed down the acquisition pipeline. The engine
/// never mutates it except to reorder the ladder.
#[derive(Debug, Clone)]
pub struct PageOptions {
    /// Ordered crawler kinds, tried front to back
    pub ladder: Vec<CrawlerKind>,

    /// User agent override
    pub user_agent: Option<String>,

    /// Per-request timeout override
    pub timeout: Option<Duration>,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            ladder: vec![
                CrawlerKind::Http,
                CrawlerKind::Headless,
                CrawlerKind::FullBrowser,
            ],
            user_agent: None,
            timeout: None,
        }
    }
}

impl PageOptions {
    /// Default options with the escalation rule table applied for the URL.
    pub fn for_url(url: &str) -> Self {
        let mut options = Self::default();
        if let Some(host) = UrlLocation::new(url).get_domain_only() {
            for (pattern, kind) in ESCALATION_RULES {
                if host == *pattern || host.ends_with(&format!(".{pattern}")) {
                    options.bring_to_front(*kind);
                    break;
                }
            }
        }
        options
    }

    /// Move the preferred backend to the front, keeping the rest in order.
    pub fn bring_to_front(&mut self, kind: CrawlerKind) {
        self.ladder.retain(|k| *k != kind);
        self.ladder.insert(0, kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ladder_order() {
        let options = PageOptions::default();
        assert_eq!(
            options.ladder,
            vec![
                CrawlerKind::Http,
                CrawlerKind::Headless,
                CrawlerKind::FullBrowser
            ]
        );
    }

    #[test]
    fn test_bring_to_front() {
        let mut options = PageOptions::default();
        options.bring_to_front(CrawlerKind::FullBrowser);
        assert_eq!(options.ladder[0], CrawlerKind::FullBrowser);
        assert_eq!(options.ladder.len(), 3);
    }

    #[test]
    fn test_rule_table_applies() {
        let options = PageOptions::for_url("https://www.reddit.com/r/rust");
        assert_eq!(options.ladder[0], CrawlerKind::Headless);

        let options = PageOptions::for_url("https://x.com/someone");
        assert_eq!(options.ladder[0], CrawlerKind::FullBrowser);

        let options = PageOptions::for_url("https://example.com/page");
        assert_eq!(options.ladder[0], CrawlerKind::Http);
    }
}
