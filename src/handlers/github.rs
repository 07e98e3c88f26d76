//! GitHub recognizer

use url::Url;

use crate::location::UrlLocation;

/// Path prefixes that are product pages, not repositories.
const NON_REPO_PREFIXES: &[&str] = &[
    "features", "topics", "trending", "marketplace", "sponsors", "settings", "login", "about",
    "pricing", "explore",
];

/// Recognize a GitHub repository URL. Returns
/// `(canonical_url, "owner/repo")`.
pub(crate) fn probe(url: &str) -> Option<(String, String)> {
    let location = UrlLocation::new(url);
    let host = location.get_domain_only()?;
    if host != "github.com" && host != "www.github.com" {
        return None;
    }

    let parsed = Url::parse(location.as_str()).ok()?;
    let segments: Vec<&str> = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .collect();

    match segments.as_slice() {
        [owner, repo, ..] if !NON_REPO_PREFIXES.contains(owner) => {
            let repo = repo.trim_end_matches(".git");
            let code = format!("{owner}/{repo}");
            Some((format!("https://github.com/{code}"), code))
        }
        _ => None,
    }
}

/// Commit, release and tag Atom feeds for a repository.
pub(crate) fn feeds(code: &str) -> Vec<String> {
    vec![
        format!("https://github.com/{code}/commits.atom"),
        format!("https://github.com/{code}/releases.atom"),
        format!("https://github.com/{code}/tags.atom"),
    ]
}
