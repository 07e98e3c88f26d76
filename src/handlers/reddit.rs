//! Reddit recognizer

use url::Url;

use crate::location::UrlLocation;

/// Recognize a Reddit URL. Returns `(canonical_url, subreddit)`.
pub(crate) fn probe(url: &str) -> Option<(String, String)> {
    let location = UrlLocation::new(url);
    let host = location.get_domain_only()?;
    if host != "reddit.com" && !host.ends_with(".reddit.com") {
        return None;
    }

    let parsed = Url::parse(location.as_str()).ok()?;
    let segments: Vec<&str> = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .collect();

    match segments.as_slice() {
        ["r", sub, ..] => Some((
            format!("https://www.reddit.com/r/{sub}"),
            (*sub).to_string(),
        )),
        ["u", user, ..] | ["user", user, ..] => Some((
            format!("https://www.reddit.com/user/{user}"),
            (*user).to_string(),
        )),
        _ => None,
    }
}

/// Subreddit RSS feed.
pub(crate) fn feeds(code: &str) -> Vec<String> {
    vec![format!("https://www.reddit.com/r/{code}/.rss")]
}

/// Reddit blocks unrecognized clients with a plain-text notice.
pub(crate) fn is_blocked(status: u16, text: &str) -> bool {
    status == 403 || text.contains("whoa there, pardner")
}
