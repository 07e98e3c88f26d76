//! Fetching through an escalation ladder of crawler backends
//!
//! A fetch attempt carries an ordered list of crawler backends (plain HTTP,
//! headless browser, full browser) and walks it until one produces a usable
//! response. Rate limiting (HTTP 429) retries the same backend a fixed
//! number of times and is the only fatal failure mode; everything else
//! degrades to "no response".
//!
//! The request/response pair and the backend trait form the wire boundary:
//! the engine bundles a plain-HTTP backend and treats anything more capable
//! as an injected dependency.

pub mod backend;
pub mod builder;
pub mod bulk;
pub mod options;
pub mod request;

pub use backend::{CrawlerBackend, HttpClientBackend};
pub use builder::RequestBuilder;
pub use bulk::fetch_all;
pub use options::{CrawlerKind, PageOptions};
pub use request::{Request, Response};
