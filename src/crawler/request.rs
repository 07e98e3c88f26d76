//! Request and response value types for the crawler boundary

use std::collections::HashMap;
use std::time::Duration;

/// One outgoing fetch request.
#[derive(Debug, Clone)]
pub struct Request {
    /// Target URL
    pub url: String,

    /// Extra headers merged over the backend defaults
    pub headers: HashMap<String, String>,

    /// Per-request timeout
    pub timeout: Duration,

    /// User agent override; the backend rotates its own pool when unset
    pub user_agent: Option<String>,

    /// Cookies sent with the request
    pub cookies: HashMap<String, String>,

    /// Proxy URL, when the fetch must be routed
    pub proxy: Option<String>,

    /// Name of the crawler backend this request is intended for
    pub crawler_name: Option<String>,
}

impl Request {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            headers: HashMap::new(),
            timeout: Duration::from_secs(30),
            user_agent: None,
            cookies: HashMap::new(),
            proxy: None,
            crawler_name: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = Some(user_agent.to_string());
        self
    }
}

/// One fetched response.
#[derive(Debug, Clone)]
pub struct Response {
    /// Final URL after redirects
    pub url: String,

    /// HTTP status code
    pub status_code: u16,

    /// Response headers, keys lower-cased
    pub headers: HashMap<String, String>,

    /// Raw body bytes
    pub binary: Vec<u8>,

    /// Decoded body text
    pub text: String,

    /// Detected character encoding label
    pub encoding: Option<String>,

    /// Name of the crawler backend that produced this response
    pub crawler: String,
}

impl Response {
    /// Structural validity by status code: 2xx and 300-304 are valid, 403
    /// is valid-but-restricted, informational and error codes are not.
    pub fn is_valid(&self) -> bool {
        is_valid_status(self.status_code)
    }

    /// 403: the server answered but refuses the default identity.
    pub fn is_restricted(&self) -> bool {
        self.status_code == 403
    }

    /// HTTP 429 and equivalents.
    pub fn is_rate_limited(&self) -> bool {
        self.status_code == 429
    }

    /// Declared content type, without parameters.
    pub fn content_type(&self) -> Option<&str> {
        let raw = self.headers.get("content-type")?;
        Some(raw.split(';').next().unwrap_or(raw).trim())
    }
}

/// Status-code classification shared by the whole engine.
pub fn is_valid_status(status: u16) -> bool {
    match status {
        200..=299 => true,
        300..=304 => true,
        403 => true,
        _ => false,
    }
}
