//! Pure URL parsing, normalization and classification
//!
//! [`UrlLocation`] wraps a raw URL string and answers structural questions
//! about it without ever touching the network. Links arrive here straight
//! from scraped documents, so the accepted grammar is wider than RFC 3986:
//! protocol-relative (`//host/path`) and Windows-UNC-style (`\\host\path`)
//! forms are normalized, and obviously malformed extraction artifacts
//! (hosts containing `&` or `?`, dot-less hosts) are rejected.
//!
//! Site classification (`is_mainstream`, `is_analytics`, ...) is table
//! driven. Extend the tables, not the algorithms.

/// Domains considered mainstream platforms rather than independent sites.
const MAINSTREAM_DOMAINS: &[&str] = &[
    "youtube.com",
    "youtu.be",
    "reddit.com",
    "twitter.com",
    "x.com",
    "facebook.com",
    "instagram.com",
    "tiktok.com",
    "linkedin.com",
    "github.com",
    "news.ycombinator.com",
    "wikipedia.org",
    "medium.com",
    "odysee.com",
    "rumble.com",
    "quora.com",
    "pinterest.com",
    "twitch.tv",
];

/// YouTube host names, including the short-link domain.
const YOUTUBE_DOMAINS: &[&str] = &["youtube.com", "youtu.be"];

/// Trackers and analytics endpoints that carry no content worth fetching.
const ANALYTICS_DOMAINS: &[&str] = &[
    "google-analytics.com",
    "googletagmanager.com",
    "doubleclick.net",
    "googlesyndication.com",
    "adservice.google.com",
    "hotjar.com",
    "mixpanel.com",
    "segment.io",
    "segment.com",
    "scorecardresearch.com",
    "quantserve.com",
    "chartbeat.com",
    "crazyegg.com",
    "nr-data.net",
    "amplitude.com",
    "branch.io",
    "onesignal.com",
    "clarity.ms",
];

/// Link-shortener services; the target only resolves after a fetch.
const LINK_SERVICE_DOMAINS: &[&str] = &[
    "bit.ly",
    "tinyurl.com",
    "t.co",
    "goo.gl",
    "ow.ly",
    "buff.ly",
    "lnkd.in",
    "is.gd",
    "cutt.ly",
    "rb.gy",
    "tiny.cc",
    "rebrand.ly",
    "t.ly",
    "v.gd",
    "dlvr.it",
    "trib.al",
];

/// Schemes accepted by [`UrlLocation::is_web_link`].
const WEB_SCHEMES: &[&str] = &["http", "https", "smb", "ftp"];

/// A parsed view over one URL string. Construction never fails; accessors
/// return `None` for parts the input does not carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlLocation {
    url: String,
}

impl UrlLocation {
    /// Wrap a raw URL. Backslash forms are normalized to forward slashes.
    pub fn new(url: &str) -> Self {
        Self {
            url: url.trim().replace('\\', "/"),
        }
    }

    /// The normalized URL string.
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Split off `(scheme, separator, rest)`. `scheme` is empty for
    /// protocol-relative input. Returns `None` when no separator exists.
    fn scheme_parts(&self) -> Option<(&str, &str, &str)> {
        if let Some(idx) = self.url.find("://") {
            let scheme = &self.url[..idx];
            if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric()) {
                return None;
            }
            return Some((scheme, "://", &self.url[idx + 3..]));
        }
        if let Some(rest) = self.url.strip_prefix("//") {
            return Some(("", "//", rest));
        }
        None
    }

    /// The raw host segment (`user@host:port` as written), if any.
    fn raw_host(&self) -> Option<&str> {
        let (_, _, rest) = self.scheme_parts()?;
        let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        let host = &rest[..end];
        if host.is_empty() {
            None
        } else {
            Some(host)
        }
    }

    /// `scheme://host[:port]` with the host lower-cased and any `user@`
    /// segment stripped. Protocol-relative input resolves to `https`.
    /// Returns `None` for inputs that are not protocol-prefixed.
    pub fn get_domain(&self) -> Option<String> {
        let (scheme, _, _) = self.scheme_parts()?;
        let host = self.raw_host()?;
        let host = host.rsplit('@').next().unwrap_or(host).to_lowercase();
        if host.is_empty() {
            return None;
        }
        let scheme = if scheme.is_empty() { "https" } else { scheme };
        Some(format!("{scheme}://{host}"))
    }

    /// Bare host name, without scheme, port or `user@` segment.
    pub fn get_domain_only(&self) -> Option<String> {
        let host = self.raw_host()?;
        let host = host.rsplit('@').next().unwrap_or(host);
        let host = host.split(':').next().unwrap_or(host);
        if host.is_empty() {
            None
        } else {
            Some(host.to_lowercase())
        }
    }

    /// Explicit port, when one is written into the URL.
    pub fn get_port(&self) -> Option<u16> {
        let host = self.raw_host()?;
        let host = host.rsplit('@').next().unwrap_or(host);
        let (_, port) = host.rsplit_once(':')?;
        port.parse().ok()
    }

    /// File extension of the last path segment, ignoring query/fragment.
    pub fn get_extension(&self) -> Option<String> {
        let (_, _, rest) = self.scheme_parts()?;
        let end = rest.find(['?', '#']).unwrap_or(rest.len());
        let path = &rest[..end];
        let last = path.rsplit('/').next()?;
        let (_, ext) = last.rsplit_once('.')?;
        if ext.is_empty() || ext.len() > 8 {
            None
        } else {
            Some(ext.to_lowercase())
        }
    }

    /// Break the URL into `[scheme, separator, host, segments..., query]`.
    ///
    /// [`UrlLocation::join`] is the inverse for any input accepted by
    /// [`UrlLocation::is_web_link`].
    pub fn split(&self) -> Vec<String> {
        let Some((scheme, sep, rest)) = self.scheme_parts() else {
            return vec![self.url.clone()];
        };

        let mut parts = vec![scheme.to_string(), sep.to_string()];

        let host_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        parts.push(rest[..host_end].to_string());

        let tail = &rest[host_end..];
        if tail.is_empty() {
            return parts;
        }

        if tail.starts_with('?') || tail.starts_with('#') {
            parts.push(tail.to_string());
            return parts;
        }

        // tail starts with '/'
        let query_start = tail.find(['?', '#']).unwrap_or(tail.len());
        let path = &tail[1..query_start];
        for segment in path.split('/') {
            parts.push(segment.to_string());
        }
        let query = &tail[query_start..];
        if !query.is_empty() {
            parts.push(query.to_string());
        }

        parts
    }

    /// Reassemble the output of [`UrlLocation::split`].
    pub fn join(parts: &[String]) -> String {
        if parts.len() < 3 {
            return parts.concat();
        }
        let mut url = format!("{}{}{}", parts[0], parts[1], parts[2]);
        for part in &parts[3..] {
            if part.starts_with('?') || part.starts_with('#') {
                url.push_str(part);
            } else {
                url.push('/');
                url.push_str(part);
            }
        }
        url
    }

    /// Whether this looks like a fetchable web link.
    ///
    /// Accepts `http(s)`, `smb`, `ftp`, protocol-relative and UNC-style
    /// forms. Rejects hosts without a dot and hosts carrying `&` or `?`
    /// characters, which are artifacts of sloppy link extraction.
    pub fn is_web_link(&self) -> bool {
        let Some((scheme, _, _)) = self.scheme_parts() else {
            return false;
        };
        if !scheme.is_empty() && !WEB_SCHEMES.contains(&scheme.to_lowercase().as_str()) {
            return false;
        }
        let Some(host) = self.raw_host() else {
            return false;
        };
        let host = host.rsplit('@').next().unwrap_or(host);
        if !host.contains('.') {
            return false;
        }
        !host.contains('&') && !host.contains('?') && !host.contains(' ')
    }

    /// The parent resource: drop the last path segment, or promote to the
    /// parent domain at the root. Fails at the two-label domain boundary.
    pub fn up(&self) -> Option<UrlLocation> {
        let parts = self.split();
        if parts.len() < 3 {
            return None;
        }

        // Query or path present: strip the last element.
        if parts.len() > 3 {
            let parent = Self::join(&parts[..parts.len() - 1]);
            return Some(UrlLocation::new(&parent));
        }

        // At the domain root: promote to the parent domain.
        let host = self.get_domain_only()?;
        let labels: Vec<&str> = host.split('.').collect();
        if labels.len() <= 2 {
            return None;
        }
        let parent_host = labels[1..].join(".");
        let scheme = if parts[0].is_empty() { "https" } else { &parts[0] };
        Some(UrlLocation::new(&format!("{scheme}://{parent_host}")))
    }

    /// URL of the domain's robots.txt document.
    pub fn get_robots_txt_url(&self) -> Option<String> {
        Some(format!("{}/robots.txt", self.get_domain()?))
    }

    fn host_in_table(&self, table: &[&str]) -> bool {
        let Some(host) = self.get_domain_only() else {
            return false;
        };
        table
            .iter()
            .any(|d| host == *d || host.ends_with(&format!(".{d}")))
    }

    /// Whether the host belongs to a mainstream platform.
    pub fn is_mainstream(&self) -> bool {
        self.host_in_table(MAINSTREAM_DOMAINS)
    }

    /// Whether the host is YouTube (including the short-link domain).
    pub fn is_youtube(&self) -> bool {
        self.host_in_table(YOUTUBE_DOMAINS)
    }

    /// Whether the host is a tracker/analytics endpoint.
    pub fn is_analytics(&self) -> bool {
        self.host_in_table(ANALYTICS_DOMAINS)
    }

    /// Whether the host is a link-shortener service.
    pub fn is_link_service(&self) -> bool {
        self.host_in_table(LINK_SERVICE_DOMAINS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_domain_basic() {
        let loc = UrlLocation::new("https://WWW.Example.COM/path?q=1");
        assert_eq!(loc.get_domain().unwrap(), "https://www.example.com");
    }

    #[test]
    fn test_get_domain_keeps_port() {
        let loc = UrlLocation::new("http://example.com:8080/x");
        assert_eq!(loc.get_domain().unwrap(), "http://example.com:8080");
        assert_eq!(loc.get_port(), Some(8080));
    }

    #[test]
    fn test_get_domain_strips_user() {
        let loc = UrlLocation::new("https://bob@example.com/x");
        assert_eq!(loc.get_domain().unwrap(), "https://example.com");
    }

    #[test]
    fn test_get_domain_rejects_relative() {
        assert!(UrlLocation::new("/just/a/path").get_domain().is_none());
        assert!(UrlLocation::new("example.com/x").get_domain().is_none());
    }

    #[test]
    fn test_protocol_relative_domain() {
        let loc = UrlLocation::new("//cdn.example.com/app.js");
        assert_eq!(loc.get_domain().unwrap(), "https://cdn.example.com");
    }

    #[test]
    fn test_backslash_form() {
        let loc = UrlLocation::new(r"\\fileserver.local\share");
        assert_eq!(loc.get_domain_only().unwrap(), "fileserver.local");
    }

    #[test]
    fn test_split_join_round_trip() {
        for url in [
            "https://example.com",
            "https://example.com/",
            "https://example.com/a/b",
            "https://example.com/a/b/",
            "https://example.com/a/b?q=1&x=2",
            "https://example.com?q=1",
            "https://example.com/a#frag",
            "//example.com/a/b",
            "ftp://files.example.com/pub/file.txt",
        ] {
            let loc = UrlLocation::new(url);
            assert!(loc.is_web_link(), "{url} should be a web link");
            assert_eq!(UrlLocation::join(&loc.split()), url, "round trip for {url}");
        }
    }

    #[test]
    fn test_is_web_link() {
        assert!(UrlLocation::new("https://example.com/x").is_web_link());
        assert!(UrlLocation::new("smb://nas.local.lan/share").is_web_link());
        assert!(UrlLocation::new("//example.com/x").is_web_link());
        assert!(UrlLocation::new(r"\\host.example.com\x").is_web_link());

        assert!(!UrlLocation::new("mailto:a@b.com").is_web_link());
        assert!(!UrlLocation::new("https://localhost/x").is_web_link());
        assert!(!UrlLocation::new("https://foo&bar.com/x").is_web_link());
        assert!(!UrlLocation::new("not a url").is_web_link());
    }

    #[test]
    fn test_up_path() {
        let loc = UrlLocation::new("https://example.com/a/b");
        assert_eq!(loc.up().unwrap().as_str(), "https://example.com/a");
        let loc = UrlLocation::new("https://example.com/a");
        assert_eq!(loc.up().unwrap().as_str(), "https://example.com");
    }

    #[test]
    fn test_up_query_only() {
        let loc = UrlLocation::new("https://example.com?q=1");
        assert_eq!(loc.up().unwrap().as_str(), "https://example.com");
    }

    #[test]
    fn test_up_domain_promotion() {
        let loc = UrlLocation::new("https://blog.example.com");
        assert_eq!(loc.up().unwrap().as_str(), "https://example.com");
        assert!(UrlLocation::new("https://example.com").up().is_none());
    }

    #[test]
    fn test_robots_txt_url() {
        let loc = UrlLocation::new("https://example.com/deep/page?x=1");
        assert_eq!(
            loc.get_robots_txt_url().unwrap(),
            "https://example.com/robots.txt"
        );
    }

    #[test]
    fn test_extension() {
        assert_eq!(
            UrlLocation::new("https://example.com/a/pic.JPG?s=2").get_extension(),
            Some("jpg".to_string())
        );
        assert_eq!(UrlLocation::new("https://example.com/a/b").get_extension(), None);
    }

    #[test]
    fn test_classification_tables() {
        assert!(UrlLocation::new("https://www.youtube.com/watch?v=x").is_youtube());
        assert!(UrlLocation::new("https://youtu.be/x").is_youtube());
        assert!(!UrlLocation::new("https://example.com").is_youtube());

        assert!(UrlLocation::new("https://www.reddit.com/r/rust").is_mainstream());
        assert!(UrlLocation::new("https://github.com/o/r").is_mainstream());
        assert!(!UrlLocation::new("https://smallblog.net").is_mainstream());

        assert!(UrlLocation::new("https://www.google-analytics.com/ga.js").is_analytics());
        assert!(UrlLocation::new("https://bit.ly/abc").is_link_service());
        assert!(!UrlLocation::new("https://example.com").is_link_service());
    }
}
