//! lodestone - Content acquisition engine for feed/bookmark aggregators
//!
//! Given an arbitrary URL, lodestone decides how to fetch it, what kind of
//! document came back, and what normalized facts to extract from it.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`location`] - Pure URL parsing, normalization and classification
//! - [`feeds`] - Lenient RSS/Atom parsing
//! - [`content`] - Content classification and property extraction
//! - [`handlers`] - Site-specific URL handlers and dispatch
//! - [`crawler`] - Fetching through an escalation ladder of backends
//! - [`policy`] - Per-domain robots.txt policy cache
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use lodestone::remote::RemoteUrl;
//! use lodestone::crawler::RequestBuilder;
//! use lodestone::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let builder = RequestBuilder::new(&config)?;
//!     let mut url = RemoteUrl::new("https://www.youtube.com/watch?v=1234");
//!     let props = url.properties(&builder).await?;
//!     println!("{}", serde_json::to_string_pretty(&props)?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod content;
pub mod crawler;
pub mod error;
pub mod feeds;
pub mod handlers;
pub mod location;
pub mod policy;
pub mod remote;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::content::{Page, PageFactory, Properties};
    pub use crate::crawler::{CrawlerKind, PageOptions, Request, RequestBuilder, Response};
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::feeds::FeedReader;
    pub use crate::handlers::{Handler, HandlerRegistry};
    pub use crate::location::UrlLocation;
    pub use crate::policy::DomainPolicyCache;
    pub use crate::remote::RemoteUrl;
}

// Direct re-exports for convenience
pub use content::{Page, Properties};
pub use remote::RemoteUrl;
