//! Lenient RSS/Atom feed parsing
//!
//! Real-world feeds are frequently malformed: served with the wrong content
//! type inside an HTML wrapper, double-encoded as HTML entities, missing
//! closing tags, or mixing RSS 2.0, Atom and media-namespace vocabularies in
//! one document. [`FeedReader`] accepts all of that and degrades to "no
//! entries" instead of failing; callers cannot distinguish an empty feed
//! from an unparseable one except through logs.

pub mod entry;
pub mod reader;

pub use entry::FeedEntry;
pub use reader::{FeedHeader, FeedReader};
