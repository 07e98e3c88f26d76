//! Crawler backends
//!
//! [`CrawlerBackend`] is the pluggable fetch executor. The engine bundles
//! the plain HTTP backend; headless and full-browser backends are injected
//! by callers that run them, and the escalation ladder simply skips kinds
//! with no registered backend.

use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use std::collections::HashMap;
use std::num::NonZeroU32;

use crate::config::CrawlerConfig;
use crate::crawler::options::CrawlerKind;
use crate::crawler::request::{Request, Response};
use crate::utils::error::FetchError;

/// Pool of realistic User-Agent strings for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// A pluggable fetch executor.
#[async_trait]
pub trait CrawlerBackend: Send + Sync {
    /// Which ladder slot this backend fills.
    fn kind(&self) -> CrawlerKind;

    /// Backend name recorded on produced responses.
    fn name(&self) -> &'static str;

    /// Execute one fetch. Network failures are errors; HTTP error statuses
    /// are responses.
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError>;
}

/// Plain HTTP backend with rate limiting and charset-aware decoding.
pub struct HttpClientBackend {
    client: Client,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl HttpClientBackend {
    /// Create the backend from crawler configuration.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(config: &CrawlerConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .gzip(true)
            .cookie_store(config.enable_cookies)
            .build()?;

        let rate = NonZeroU32::new(config.rate_limit).unwrap_or(NonZeroU32::new(1).unwrap());
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            rate_limiter,
        })
    }

    /// Build request headers with a rotated user agent.
    fn build_headers(&self, request: &Request) -> HeaderMap {
        let mut headers = HeaderMap::new();

        match &request.user_agent {
            Some(ua) => {
                if let Ok(value) = HeaderValue::from_str(ua) {
                    headers.insert(USER_AGENT, value);
                }
            }
            None => {
                headers.insert(USER_AGENT, HeaderValue::from_static(random_user_agent()));
            }
        }

        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );

        for (key, value) in &request.headers {
            let Ok(name) = reqwest::header::HeaderName::from_bytes(key.as_bytes()) else {
                continue;
            };
            if let Ok(value) = HeaderValue::from_str(value) {
                headers.insert(name, value);
            }
        }

        headers
    }
}

#[async_trait]
impl CrawlerBackend for HttpClientBackend {
    fn kind(&self) -> CrawlerKind {
        CrawlerKind::Http
    }

    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        self.rate_limiter.until_ready().await;

        let headers = self.build_headers(request);
        let result = self
            .client
            .get(&request.url)
            .headers(headers)
            .timeout(request.timeout)
            .send()
            .await;

        let response = match result {
            Ok(r) => r,
            Err(e) if e.is_timeout() => return Err(FetchError::Timeout),
            Err(e) => return Err(FetchError::Http(e)),
        };

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.as_str().to_lowercase(), v.to_string());
            }
        }

        let bytes = response.bytes().await.map_err(FetchError::Http)?;
        let content_type = headers.get("content-type").cloned().unwrap_or_default();
        let (text, encoding) = decode_bytes(&bytes, &content_type);

        Ok(Response {
            url: final_url,
            status_code: status,
            headers,
            binary: bytes.to_vec(),
            text,
            encoding,
            crawler: self.name().to_string(),
        })
    }
}

/// Get a random user agent from the pool
fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS.choose(&mut rng).unwrap_or(&USER_AGENTS[0])
}

/// Decode body bytes to UTF-8 text with encoding detection.
///
/// Strategies, in order: the charset declared in the Content-Type header,
/// a straight UTF-8 decode, and a meta-charset sniff over the document
/// head. Decoding is lossy at worst, never an error; binary bodies simply
/// produce replacement-heavy text that classification will ignore.
pub fn decode_bytes(bytes: &[u8], content_type: &str) -> (String, Option<String>) {
    if let Some(label) = charset_label(content_type) {
        if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
            let (text, _, _) = encoding.decode(bytes);
            return (text.into_owned(), Some(encoding.name().to_lowercase()));
        }
    }

    let (text, _, had_errors) = UTF_8.decode(bytes);
    if !had_errors {
        return (text.into_owned(), Some("utf-8".to_string()));
    }

    // Meta charset sniff over the first kilobyte.
    let partial = String::from_utf8_lossy(&bytes[..bytes.len().min(1024)]);
    if let Some(label) = charset_label(&partial) {
        if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
            let (text, _, _) = encoding.decode(bytes);
            return (text.into_owned(), Some(encoding.name().to_lowercase()));
        }
    }

    (
        String::from_utf8_lossy(bytes).into_owned(),
        Some("utf-8".to_string()),
    )
}

/// Extract a `charset=...` label from header or markup text.
fn charset_label(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    let idx = lower.find("charset=")?;
    let rest = &lower[idx + "charset=".len()..];
    let label: String = rest
        .trim_start_matches(['"', '\''])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if label.is_empty() {
        None
    } else {
        Some(label)
    }
}
