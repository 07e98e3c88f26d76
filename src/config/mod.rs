//! Configuration management for the lodestone engine
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Crawler configuration
    pub crawler: CrawlerConfig,

    /// Domain policy (robots.txt) configuration
    pub policy: PolicyConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Crawler-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of concurrent requests in a bulk batch
    pub max_concurrent_requests: usize,

    /// Rate limit (requests per second) applied by the HTTP backend
    pub rate_limit: u32,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// User agent string
    pub user_agent: String,

    /// Total attempts against one backend when rate limited (HTTP 429)
    pub rate_limit_attempts: u32,

    /// Enable cookie persistence
    pub enable_cookies: bool,
}

/// Domain policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Maximum number of domains kept in the robots policy cache
    pub cache_size: usize,

    /// Timeout for robots.txt fetches in seconds
    pub robots_timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig {
                max_concurrent_requests: 10,
                rate_limit: 2,
                request_timeout_secs: 30,
                user_agent: format!("lodestone/{}", env!("CARGO_PKG_VERSION")),
                rate_limit_attempts: 4,
                enable_cookies: true,
            },
            policy: PolicyConfig {
                cache_size: 400,
                robots_timeout_secs: 10,
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let max_concurrent_requests = std::env::var("LODESTONE_MAX_CONCURRENT_REQUESTS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.crawler.max_concurrent_requests);

        let rate_limit = std::env::var("LODESTONE_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(defaults.crawler.rate_limit);

        let request_timeout_secs = std::env::var("LODESTONE_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.crawler.request_timeout_secs);

        let user_agent =
            std::env::var("LODESTONE_USER_AGENT").unwrap_or(defaults.crawler.user_agent);

        let rate_limit_attempts = std::env::var("LODESTONE_RATE_LIMIT_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(defaults.crawler.rate_limit_attempts);

        let cache_size = std::env::var("LODESTONE_POLICY_CACHE_SIZE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.policy.cache_size);

        let robots_timeout_secs = std::env::var("LODESTONE_ROBOTS_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.policy.robots_timeout_secs);

        let level = std::env::var("LODESTONE_LOG_LEVEL").unwrap_or(defaults.logging.level);
        let format = std::env::var("LODESTONE_LOG_FORMAT").unwrap_or(defaults.logging.format);

        let config = Self {
            crawler: CrawlerConfig {
                max_concurrent_requests,
                rate_limit,
                request_timeout_secs,
                user_agent,
                rate_limit_attempts,
                enable_cookies: true,
            },
            policy: PolicyConfig {
                cache_size,
                robots_timeout_secs,
            },
            logging: LoggingConfig { level, format },
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.crawler.max_concurrent_requests == 0 {
            anyhow::bail!("max_concurrent_requests must be at least 1");
        }
        if self.crawler.rate_limit == 0 {
            anyhow::bail!("rate_limit must be at least 1");
        }
        if self.crawler.rate_limit_attempts == 0 {
            anyhow::bail!("rate_limit_attempts must be at least 1");
        }
        if self.policy.cache_size == 0 {
            anyhow::bail!("policy cache_size must be at least 1");
        }
        Ok(())
    }

    /// Request timeout as a [`Duration`]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.crawler.request_timeout_secs)
    }

    /// robots.txt fetch timeout as a [`Duration`]
    pub fn robots_timeout(&self) -> Duration {
        Duration::from_secs(self.policy.robots_timeout_secs)
    }
}
