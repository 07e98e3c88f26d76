//! YouTube video and channel recognizers

use url::Url;

use crate::location::UrlLocation;

/// Recognize a YouTube video URL. Returns `(canonical_url, video_id)`.
///
/// Accepted shapes: `watch?v=<id>`, `youtu.be/<id>`, `/shorts/<id>`,
/// `/embed/<id>`. The canonical form drops every other query parameter.
pub(crate) fn probe_video(url: &str) -> Option<(String, String)> {
    let location = UrlLocation::new(url);
    if !location.is_youtube() {
        return None;
    }

    let parsed = Url::parse(location.as_str()).ok()?;
    let host = parsed.host_str()?.to_lowercase();

    let id = if host.ends_with("youtu.be") {
        parsed
            .path_segments()
            .and_then(|mut segments| segments.next())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    } else if parsed.path() == "/watch" {
        parsed
            .query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.into_owned())
    } else {
        let mut segments = parsed.path_segments()?;
        match segments.next() {
            Some("shorts") | Some("embed") => {
                segments.next().filter(|s| !s.is_empty()).map(str::to_string)
            }
            _ => None,
        }
    }?;

    Some((format!("https://www.youtube.com/watch?v={id}"), id))
}

/// Recognize a YouTube channel URL. Returns `(canonical_url, code)` where
/// the code is a channel id (`UC...`) or a handle (`@name`).
pub(crate) fn probe_channel(url: &str) -> Option<(String, String)> {
    let location = UrlLocation::new(url);
    if !location.is_youtube() {
        return None;
    }

    let parsed = Url::parse(location.as_str()).ok()?;

    // Feed URLs identify the channel directly.
    if parsed.path() == "/feeds/videos.xml" {
        let id = parsed
            .query_pairs()
            .find(|(k, _)| k == "channel_id")
            .map(|(_, v)| v.into_owned())?;
        return Some((format!("https://www.youtube.com/channel/{id}"), id));
    }

    let mut segments = parsed.path_segments()?;
    let first = segments.next()?;

    if let Some(handle) = first.strip_prefix('@') {
        if !handle.is_empty() {
            return Some((
                format!("https://www.youtube.com/@{handle}"),
                format!("@{handle}"),
            ));
        }
        return None;
    }

    match first {
        "channel" | "c" | "user" => {
            let name = segments.next().filter(|s| !s.is_empty())?;
            Some((
                format!("https://www.youtube.com/{first}/{name}"),
                name.to_string(),
            ))
        }
        _ => None,
    }
}

/// Feed URLs for a channel code. Only channel ids map to the videos feed;
/// handles need a fetch to resolve and yield nothing here.
pub(crate) fn channel_feeds(code: &str) -> Vec<String> {
    if code.starts_with("UC") {
        vec![format!(
            "https://www.youtube.com/feeds/videos.xml?channel_id={code}"
        )]
    } else {
        Vec::new()
    }
}
