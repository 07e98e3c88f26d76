//! Per-domain robots.txt policy cache
//!
//! Robots policy is fetched once per domain, parsed, and kept in a bounded
//! most-recently-used cache so concurrent fetches reuse the same state.
//! `Sitemap:` lines are harvested by a line scan of the raw text, since the
//! rule engine does not expose them. Policy is advisory: this module
//! reports the decision, callers decide enforcement.

use lru::LruCache;
use regex::Regex;
use std::num::NonZeroUsize;
use std::sync::{Arc, OnceLock};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::crawler::builder::RequestBuilder;
use crate::crawler::options::{CrawlerKind, PageOptions};
use crate::location::UrlLocation;

/// Default bound on cached domains.
pub const DEFAULT_CACHE_SIZE: usize = 400;

fn sitemap_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?im)^\s*sitemap:\s*(\S+)").expect("Invalid regex pattern"))
}

/// Parsed robots rules for the wildcard user agent.
///
/// Only the `*` group is consulted; callers cannot request a different
/// identity's rules.
#[derive(Debug, Clone, Default)]
pub struct RobotsRules {
    disallow: Vec<String>,
    allow: Vec<String>,
    crawl_delay: Option<f64>,
}

impl RobotsRules {
    /// Parse robots.txt content, keeping the `*` user-agent group.
    pub fn parse(content: &str) -> Self {
        let mut rules = Self::default();
        let mut in_wildcard_group = false;

        for line in content.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            let Some((directive, value)) = line.split_once(':') else {
                continue;
            };
            let directive = directive.trim().to_lowercase();
            let value = value.trim();

            match directive.as_str() {
                "user-agent" => {
                    in_wildcard_group = value == "*";
                }
                "disallow" if in_wildcard_group => {
                    if !value.is_empty() {
                        rules.disallow.push(value.to_string());
                    }
                }
                "allow" if in_wildcard_group => {
                    if !value.is_empty() {
                        rules.allow.push(value.to_string());
                    }
                }
                "crawl-delay" if in_wildcard_group => {
                    if let Ok(delay) = value.parse::<f64>() {
                        rules.crawl_delay = Some(delay);
                    }
                }
                _ => {}
            }
        }

        rules
    }

    /// Whether a path is allowed. Longest matching pattern wins; a tie
    /// goes to allow.
    pub fn is_allowed(&self, path: &str) -> bool {
        let longest = |patterns: &[String]| {
            patterns
                .iter()
                .filter(|p| path_matches(path, p))
                .map(|p| p.len())
                .max()
                .unwrap_or(0)
        };
        longest(&self.allow) >= longest(&self.disallow)
    }

    /// Crawl delay declared for the wildcard agent, in seconds.
    pub fn crawl_delay(&self) -> Option<f64> {
        self.crawl_delay
    }
}

/// Robots.txt pattern matching with `*` wildcards and `$` end anchor.
fn path_matches(path: &str, pattern: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }

    let (pattern, anchored) = match pattern.strip_suffix('$') {
        Some(p) => (p, true),
        None => (pattern, false),
    };

    if pattern.contains('*') {
        let parts: Vec<&str> = pattern.split('*').collect();
        let mut pos = 0;
        for (i, part) in parts.iter().enumerate() {
            if part.is_empty() {
                continue;
            }
            match path[pos..].find(part) {
                Some(found) if i != 0 || found == 0 => pos += found + part.len(),
                _ => return false,
            }
        }
        return !anchored || pos == path.len();
    }

    if anchored {
        return path == pattern;
    }
    path.starts_with(pattern)
}

/// Cached robots policy for one domain.
#[derive(Debug, Clone)]
pub struct DomainCacheInfo {
    /// Domain root URL (`scheme://host`)
    pub domain_url: String,

    /// Raw robots.txt text; `None` when the fetch failed or returned an
    /// error status
    pub robots_txt: Option<String>,

    /// Parsed wildcard-agent rules (allow-all when no text was fetched)
    pub rules: RobotsRules,

    /// Sitemap URLs discovered by line scan
    pub sitemaps: Vec<String>,
}

impl DomainCacheInfo {
    fn from_robots(domain_url: &str, robots_txt: Option<String>) -> Self {
        let (rules, sitemaps) = match &robots_txt {
            Some(text) => {
                let sitemaps = sitemap_line_re()
                    .captures_iter(text)
                    .filter_map(|cap| cap.get(1))
                    .map(|m| m.as_str().to_string())
                    .collect();
                (RobotsRules::parse(text), sitemaps)
            }
            None => (RobotsRules::default(), Vec::new()),
        };

        Self {
            domain_url: domain_url.to_string(),
            robots_txt,
            rules,
            sitemaps,
        }
    }

    /// Whether the wildcard agent may fetch this URL.
    pub fn is_allowed(&self, url: &str) -> bool {
        let location = UrlLocation::new(url);
        let parts = location.split();
        if parts.len() <= 3 {
            return self.rules.is_allowed("/");
        }
        let path = format!("/{}", parts[3..].join("/"));
        self.rules.is_allowed(&path)
    }
}

/// Process-wide bounded cache of per-domain robots policy.
///
/// The cache is shared so concurrent fetches reuse robots state; access is
/// serialized by a mutex. When the bound is exceeded, the least recently
/// accessed domain is evicted; the most recently accessed entries are
/// always kept.
pub struct DomainPolicyCache {
    inner: Mutex<LruCache<String, Arc<DomainCacheInfo>>>,
}

impl DomainPolicyCache {
    /// Create a cache holding at most `cache_size` domains.
    pub fn new(cache_size: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_size.max(1))
            .expect("cache_size.max(1) guarantees non-zero");
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Number of cached domains.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    /// Cached entry for a domain, refreshing its recency.
    pub async fn cached(&self, domain: &str) -> Option<Arc<DomainCacheInfo>> {
        self.inner.lock().await.get(domain).cloned()
    }

    /// Seed or replace the entry for a domain.
    pub async fn store(&self, domain: &str, info: DomainCacheInfo) -> Arc<DomainCacheInfo> {
        let info = Arc::new(info);
        self.inner
            .lock()
            .await
            .put(domain.to_string(), Arc::clone(&info));
        info
    }

    /// Policy entry for the URL's domain, fetching robots.txt on first
    /// access.
    pub async fn info(
        &self,
        builder: &RequestBuilder,
        url: &str,
    ) -> Option<Arc<DomainCacheInfo>> {
        let location = UrlLocation::new(url);
        let domain = location.get_domain_only()?;

        if let Some(cached) = self.cached(&domain).await {
            return Some(cached);
        }

        let domain_url = location
            .get_domain()
            .unwrap_or_else(|| format!("https://{domain}"));
        let robots_url = format!("{domain_url}/robots.txt");
        debug!(domain = %domain, "fetching robots policy");

        // robots.txt never escalates past plain HTTP.
        let options = PageOptions {
            ladder: vec![CrawlerKind::Http],
            ..Default::default()
        };
        let robots_txt = match builder.fetch(&robots_url, &options).await {
            Ok(Some(response)) if response.status_code >= 200 && response.status_code < 300 => {
                Some(response.text)
            }
            Ok(_) => None,
            Err(e) => {
                warn!(domain = %domain, error = %e, "robots fetch failed");
                None
            }
        };

        let info = DomainCacheInfo::from_robots(&domain_url, robots_txt);
        Some(self.store(&domain, info).await)
    }

    /// Whether policy allows fetching the URL. Unknown or unfetchable
    /// policy allows everything.
    pub async fn is_allowed(&self, builder: &RequestBuilder, url: &str) -> bool {
        match self.info(builder, url).await {
            Some(info) => info.is_allowed(url),
            None => true,
        }
    }

    /// Sitemap URLs discovered for the URL's domain.
    pub async fn sitemaps(&self, builder: &RequestBuilder, url: &str) -> Vec<String> {
        match self.info(builder, url).await {
            Some(info) => info.sitemaps.clone(),
            None => Vec::new(),
        }
    }
}

impl Default for DomainPolicyCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROBOTS: &str = "\
User-agent: googlebot\n\
Disallow: /only-google/\n\
\n\
User-agent: *\n\
Disallow: /private/\n\
Allow: /private/public/\n\
Crawl-delay: 2\n\
Sitemap: https://example.com/sitemap.xml\n\
Sitemap: https://example.com/news-sitemap.xml\n";

    #[test]
    fn test_wildcard_group_only() {
        let rules = RobotsRules::parse(ROBOTS);
        // The googlebot-only rule must not leak into the wildcard group.
        assert!(rules.is_allowed("/only-google/page"));
        assert!(!rules.is_allowed("/private/secret"));
        assert!(rules.is_allowed("/private/public/page"));
        assert_eq!(rules.crawl_delay(), Some(2.0));
    }

    #[test]
    fn test_wildcard_and_anchor_patterns() {
        let rules = RobotsRules::parse(
            "User-agent: *\nDisallow: /*.pdf$\nDisallow: /tmp/\n",
        );
        assert!(!rules.is_allowed("/docs/manual.pdf"));
        assert!(rules.is_allowed("/docs/manual.pdf.html"));
        assert!(!rules.is_allowed("/tmp/file"));
        assert!(rules.is_allowed("/docs/page.html"));
    }

    #[test]
    fn test_sitemap_line_scan() {
        let info = DomainCacheInfo::from_robots(
            "https://example.com",
            Some(ROBOTS.to_string()),
        );
        assert_eq!(
            info.sitemaps,
            vec![
                "https://example.com/sitemap.xml",
                "https://example.com/news-sitemap.xml"
            ]
        );
    }

    #[test]
    fn test_missing_robots_allows_all() {
        let info = DomainCacheInfo::from_robots("https://example.com", None);
        assert!(info.is_allowed("https://example.com/anything"));
        assert!(info.sitemaps.is_empty());
    }

    #[test]
    fn test_info_is_allowed_uses_path() {
        let info = DomainCacheInfo::from_robots(
            "https://example.com",
            Some(ROBOTS.to_string()),
        );
        assert!(!info.is_allowed("https://example.com/private/x"));
        assert!(info.is_allowed("https://example.com/open/x"));
        assert!(info.is_allowed("https://example.com"));
    }

    #[tokio::test]
    async fn test_cache_bound_and_recency() {
        let cache = DomainPolicyCache::new(3);
        for i in 0..5 {
            let domain = format!("site{i}.example.com");
            let info = DomainCacheInfo::from_robots(&format!("https://{domain}"), None);
            cache.store(&domain, info).await;
        }
        assert_eq!(cache.len().await, 3);

        // Oldest entries were dropped, most recent kept.
        assert!(cache.cached("site0.example.com").await.is_none());
        assert!(cache.cached("site1.example.com").await.is_none());
        assert!(cache.cached("site4.example.com").await.is_some());

        // Touching an entry protects it from the next eviction.
        cache.cached("site2.example.com").await.unwrap();
        let info = DomainCacheInfo::from_robots("https://new.example.com", None);
        cache.store("new.example.com", info).await;
        assert!(cache.cached("site2.example.com").await.is_some());
        assert!(cache.cached("site3.example.com").await.is_none());
    }
}
