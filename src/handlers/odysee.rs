//! Odysee video and channel recognizers

use url::Url;

use crate::location::UrlLocation;

fn odysee_host(url: &str) -> Option<Url> {
    let location = UrlLocation::new(url);
    let host = location.get_domain_only()?;
    if host != "odysee.com" && !host.ends_with(".odysee.com") {
        return None;
    }
    Url::parse(location.as_str()).ok()
}

/// Recognize an Odysee video URL (`/@channel:x/title:y`). Returns
/// `(canonical_url, code)`; the canonical form drops query and fragment.
pub(crate) fn probe_video(url: &str) -> Option<(String, String)> {
    let parsed = odysee_host(url)?;
    let segments: Vec<&str> = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .collect();

    match segments.as_slice() {
        [channel, video] if channel.starts_with('@') => {
            let code = format!("{channel}/{video}");
            Some((format!("https://odysee.com/{code}"), code))
        }
        _ => None,
    }
}

/// Recognize an Odysee channel URL (`/@name:x`). Returns
/// `(canonical_url, code)`.
pub(crate) fn probe_channel(url: &str) -> Option<(String, String)> {
    let parsed = odysee_host(url)?;
    let segments: Vec<&str> = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .collect();

    match segments.as_slice() {
        [channel] if channel.starts_with('@') => Some((
            format!("https://odysee.com/{channel}"),
            channel.to_string(),
        )),
        _ => None,
    }
}

/// The channel part of a video or channel code (`@name:x`).
pub(crate) fn channel_code(code: &str) -> &str {
    code.split('/').next().unwrap_or(code)
}

/// RSS feed for a channel handle.
pub(crate) fn channel_feeds(code: &str) -> Vec<String> {
    vec![format!("https://odysee.com/$/rss/{}", channel_code(code))]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_rewrites_away_query() {
        let (canonical, code) =
            probe_video("https://odysee.com/@samtime:1/apple-reacts:1?test").unwrap();
        assert_eq!(canonical, "https://odysee.com/@samtime:1/apple-reacts:1");
        assert_eq!(code, "@samtime:1/apple-reacts:1");
        assert_eq!(channel_code(&code), "@samtime:1");
    }

    #[test]
    fn test_channel() {
        let (canonical, code) = probe_channel("https://odysee.com/@samtime:1").unwrap();
        assert_eq!(canonical, "https://odysee.com/@samtime:1");
        assert_eq!(code, "@samtime:1");
        assert_eq!(
            channel_feeds(&code),
            vec!["https://odysee.com/$/rss/@samtime:1"]
        );
    }

    #[test]
    fn test_video_feed_uses_channel_part() {
        let (_, code) =
            probe_video("https://odysee.com/@samtime:1/apple-reacts:1").unwrap();
        assert_eq!(
            channel_feeds(&code),
            vec!["https://odysee.com/$/rss/@samtime:1"]
        );
    }

    #[test]
    fn test_rejects_non_odysee_and_plain_paths() {
        assert!(probe_video("https://example.com/@x:1/y:1").is_none());
        assert!(probe_channel("https://odysee.com/$/help").is_none());
        assert!(probe_video("https://odysee.com/@chan:1").is_none());
    }
}
