//! Site-specific URL handlers and dispatch
//!
//! A [`Handler`] identifies one site resource: the canonical URL, the
//! site-local code (video id, channel handle, repo owner/name), the fetch
//! options, and the memoized response. Handler selection probes an ordered
//! registry of recognizers and takes the first match; the generic HTTP
//! handler is the guaranteed catch-all. Order matters: later recognizers
//! assume earlier ones already claimed their URL shapes.
//!
//! Fetch state moves {Unresolved -> Resolved -> Fetched | Dead} and never
//! re-enters the network path once set: a failed fetch memoizes to Dead
//! instead of silently retrying on the next access.

pub mod github;
pub mod hackernews;
pub mod http;
pub mod odysee;
pub mod reddit;
pub mod youtube;

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::crawler::builder::RequestBuilder;
use crate::crawler::options::PageOptions;
use crate::crawler::request::Response;
use crate::utils::error::FetchError;

/// The tagged handler variants, site-specific ones first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    YoutubeVideo,
    YoutubeChannel,
    OdyseeVideo,
    OdyseeChannel,
    Reddit,
    GitHub,
    HackerNews,
    Http,
}

impl HandlerKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::YoutubeVideo => "youtube-video",
            Self::YoutubeChannel => "youtube-channel",
            Self::OdyseeVideo => "odysee-video",
            Self::OdyseeChannel => "odysee-channel",
            Self::Reddit => "reddit",
            Self::GitHub => "github",
            Self::HackerNews => "hacker-news",
            Self::Http => "http",
        }
    }
}

/// Fetch memoization state: unset -> fetched -> cached, or dead.
#[derive(Debug)]
enum FetchState {
    Unfetched,
    Fetched(Response),
    Dead,
}

fn youtube_channel_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#""channelId"\s*:\s*"(UC[0-9A-Za-z_-]+)""#).expect("Invalid regex pattern")
    })
}

/// One resolved site resource.
#[derive(Debug)]
pub struct Handler {
    kind: HandlerKind,
    url: String,
    code: Option<String>,
    options: PageOptions,
    state: FetchState,
}

impl Handler {
    fn new(kind: HandlerKind, url: String, code: Option<String>) -> Self {
        let options = PageOptions::for_url(&url);
        Self {
            kind,
            url,
            code,
            options,
            state: FetchState::Unfetched,
        }
    }

    pub fn kind(&self) -> HandlerKind {
        self.kind
    }

    /// Canonical resource URL (recognizers may have rewritten the input).
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Site-local identifier: video id, channel handle, post id,
    /// owner/name.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn options(&self) -> &PageOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: PageOptions) {
        self.options = options;
    }

    /// Channel part of an Odysee code (`@name:x`).
    pub fn channel_code(&self) -> Option<&str> {
        match self.kind {
            HandlerKind::OdyseeVideo | HandlerKind::OdyseeChannel => {
                self.code.as_deref().map(odysee::channel_code)
            }
            _ => None,
        }
    }

    /// Whether the fetch path has been closed for this handler.
    pub fn is_dead(&self) -> bool {
        matches!(self.state, FetchState::Dead)
    }

    /// The memoized response, when one was fetched.
    pub fn response(&self) -> Option<&Response> {
        match &self.state {
            FetchState::Fetched(response) => Some(response),
            _ => None,
        }
    }

    /// Fetch the resource, at most once per handler instance.
    ///
    /// Repeated calls return the memoized response without network I/O.
    /// A handler that failed once is Dead and short-circuits to `None`.
    ///
    /// # Errors
    ///
    /// `FetchError::RetryExhausted` when the fetch died rate limited; the
    /// handler is Dead afterwards.
    pub async fn get_response(
        &mut self,
        builder: &RequestBuilder,
    ) -> Result<Option<&Response>, FetchError> {
        if matches!(self.state, FetchState::Dead) {
            return Ok(None);
        }

        if matches!(self.state, FetchState::Unfetched) {
            match builder.fetch(&self.url, &self.options).await {
                Ok(Some(response)) => {
                    if self.blocked_by_site(&response) {
                        debug!(url = %self.url, "site error predicate fired, handler dead");
                        self.state = FetchState::Dead;
                        return Ok(None);
                    }
                    self.state = FetchState::Fetched(response);
                }
                Ok(None) => {
                    self.state = FetchState::Dead;
                    return Ok(None);
                }
                Err(e) => {
                    self.state = FetchState::Dead;
                    return Err(e);
                }
            }
        }

        Ok(self.response())
    }

    /// Per-handler error predicate over a structurally valid response.
    fn blocked_by_site(&self, response: &Response) -> bool {
        match self.kind {
            HandlerKind::Reddit => reddit::is_blocked(response.status_code, &response.text),
            _ => false,
        }
    }

    /// Site-specific feed URLs for this resource.
    pub fn feeds(&self) -> Vec<String> {
        match (self.kind, self.code.as_deref()) {
            (HandlerKind::YoutubeChannel, Some(code)) => youtube::channel_feeds(code),
            (HandlerKind::YoutubeVideo, _) => {
                // The channel id only exists in the fetched page.
                self.response()
                    .and_then(|r| {
                        youtube_channel_id_re()
                            .captures(&r.text)
                            .and_then(|cap| cap.get(1))
                            .map(|m| youtube::channel_feeds(m.as_str()))
                    })
                    .unwrap_or_default()
            }
            (HandlerKind::OdyseeVideo | HandlerKind::OdyseeChannel, Some(code)) => {
                odysee::channel_feeds(code)
            }
            (HandlerKind::Reddit, Some(code)) => reddit::feeds(code),
            (HandlerKind::GitHub, Some(code)) => github::feeds(code),
            (HandlerKind::HackerNews, code) => hackernews::feeds(code.unwrap_or_default()),
            _ => Vec::new(),
        }
    }
}

type ProbeFn = fn(&str) -> Option<Handler>;

fn probe_youtube_video(url: &str) -> Option<Handler> {
    youtube::probe_video(url)
        .map(|(u, c)| Handler::new(HandlerKind::YoutubeVideo, u, Some(c)))
}

fn probe_youtube_channel(url: &str) -> Option<Handler> {
    youtube::probe_channel(url)
        .map(|(u, c)| Handler::new(HandlerKind::YoutubeChannel, u, Some(c)))
}

fn probe_odysee_video(url: &str) -> Option<Handler> {
    odysee::probe_video(url).map(|(u, c)| Handler::new(HandlerKind::OdyseeVideo, u, Some(c)))
}

fn probe_odysee_channel(url: &str) -> Option<Handler> {
    odysee::probe_channel(url)
        .map(|(u, c)| Handler::new(HandlerKind::OdyseeChannel, u, Some(c)))
}

fn probe_reddit(url: &str) -> Option<Handler> {
    reddit::probe(url).map(|(u, c)| Handler::new(HandlerKind::Reddit, u, Some(c)))
}

fn probe_github(url: &str) -> Option<Handler> {
    github::probe(url).map(|(u, c)| Handler::new(HandlerKind::GitHub, u, Some(c)))
}

fn probe_hackernews(url: &str) -> Option<Handler> {
    hackernews::probe(url).map(|(u, c)| {
        let code = if c.is_empty() { None } else { Some(c) };
        Handler::new(HandlerKind::HackerNews, u, code)
    })
}

/// Ordered, first-match-wins handler registry.
///
/// Resolution is a pure function of registration order and each
/// recognizer's predicate; there is no overlap resolution beyond order.
pub struct HandlerRegistry {
    probes: Vec<ProbeFn>,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self {
            probes: vec![
                probe_youtube_video,
                probe_youtube_channel,
                probe_odysee_video,
                probe_odysee_channel,
                probe_reddit,
                probe_github,
                probe_hackernews,
            ],
        }
    }
}

impl HandlerRegistry {
    /// A registry with an explicit probe order.
    pub fn new(probes: Vec<ProbeFn>) -> Self {
        Self { probes }
    }

    /// Resolve a URL to its handler. The generic HTTP handler is the
    /// guaranteed catch-all, so this never fails.
    pub fn resolve(&self, url: &str) -> Handler {
        for probe in &self.probes {
            if let Some(handler) = probe(url) {
                debug!(url = %url, handler = handler.kind().name(), "handler resolved");
                return handler;
            }
        }
        Handler::new(HandlerKind::Http, http::canonicalize(url), None)
    }
}
