//! The request builder: escalation ladder traversal and retry policy
//!
//! One fetch walks the options ladder front to back. A rate-limited
//! response (HTTP 429) retries the *same* backend up to the configured
//! attempt count and then fails with [`FetchError::RetryExhausted`] - the
//! only error this module surfaces. Any other failure moves to the next
//! ladder entry; a fully exhausted ladder yields `Ok(None)`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::crawler::backend::{CrawlerBackend, HttpClientBackend};
use crate::crawler::options::{CrawlerKind, PageOptions};
use crate::crawler::request::{Request, Response};
use crate::utils::error::FetchError;

/// Delay between attempts against a rate-limiting server.
const RATE_LIMIT_BACKOFF: Duration = Duration::from_millis(1500);

/// Issues fetches through registered crawler backends.
pub struct RequestBuilder {
    backends: HashMap<CrawlerKind, Arc<dyn CrawlerBackend>>,
    rate_limit_attempts: u32,
    default_timeout: Duration,
    user_agent: String,
}

impl RequestBuilder {
    /// Create a builder with the bundled plain-HTTP backend registered.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let mut backends: HashMap<CrawlerKind, Arc<dyn CrawlerBackend>> = HashMap::new();
        backends.insert(
            CrawlerKind::Http,
            Arc::new(HttpClientBackend::new(&config.crawler)?),
        );

        Ok(Self {
            backends,
            rate_limit_attempts: config.crawler.rate_limit_attempts,
            default_timeout: config.request_timeout(),
            user_agent: config.crawler.user_agent.clone(),
        })
    }

    /// Register an additional backend (headless, full browser). A later
    /// registration for the same kind replaces the earlier one.
    pub fn register(&mut self, backend: Arc<dyn CrawlerBackend>) {
        self.backends.insert(backend.kind(), backend);
    }

    /// The configured user agent identity.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Fetch a URL through the options ladder.
    ///
    /// Returns `Ok(Some(response))` for the first usable response,
    /// `Ok(None)` when every ladder entry failed or produced an invalid
    /// response.
    ///
    /// # Errors
    ///
    /// `FetchError::RetryExhausted` when a backend was rate limited on
    /// every attempt. This is fatal and must not be swallowed.
    pub async fn fetch(
        &self,
        url: &str,
        options: &PageOptions,
    ) -> Result<Option<Response>, FetchError> {
        for kind in &options.ladder {
            let Some(backend) = self.backends.get(kind) else {
                debug!(kind = kind.name(), "no backend registered, skipping");
                continue;
            };

            let mut request = Request::new(url).with_timeout(
                options.timeout.unwrap_or(self.default_timeout),
            );
            if let Some(ua) = &options.user_agent {
                request = request.with_user_agent(ua);
            }
            request.crawler_name = Some(backend.name().to_string());

            match self.fetch_with_rate_limit_retry(backend.as_ref(), &request).await {
                Ok(response) if response.is_valid() => {
                    debug!(
                        url = %url,
                        status = response.status_code,
                        crawler = %response.crawler,
                        "fetch succeeded"
                    );
                    return Ok(Some(response));
                }
                Ok(response) => {
                    debug!(
                        url = %url,
                        status = response.status_code,
                        kind = kind.name(),
                        "invalid response, escalating"
                    );
                }
                Err(FetchError::RetryExhausted) => return Err(FetchError::RetryExhausted),
                Err(e) => {
                    warn!(url = %url, kind = kind.name(), error = %e, "backend failed, escalating");
                }
            }
        }

        Ok(None)
    }

    /// Retry the same backend while the server answers 429, up to the
    /// configured total attempt count.
    async fn fetch_with_rate_limit_retry(
        &self,
        backend: &dyn CrawlerBackend,
        request: &Request,
    ) -> Result<Response, FetchError> {
        for attempt in 0..self.rate_limit_attempts {
            if attempt > 0 {
                tokio::time::sleep(RATE_LIMIT_BACKOFF).await;
            }

            let response = backend.fetch(request).await?;
            if !response.is_rate_limited() {
                return Ok(response);
            }

            warn!(
                url = %request.url,
                attempt = attempt + 1,
                max = self.rate_limit_attempts,
                "rate limited"
            );
        }

        Err(FetchError::RetryExhausted)
    }
}
