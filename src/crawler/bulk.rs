//! Bulk fetch helper
//!
//! Partitions a URL list into fixed-size batches and fetches each batch
//! concurrently, bounded by `max_concurrency`, awaiting the whole batch
//! before the next one starts. Cancellation remains per-request (the
//! builder timeout); a fatal retry exhaustion on one URL is recorded as a
//! missing response, not propagated.

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::crawler::builder::RequestBuilder;
use crate::crawler::options::PageOptions;
use crate::crawler::request::Response;

/// Fetch every URL, batch by batch. Results keep input order; a URL whose
/// fetch failed maps to `None`.
pub async fn fetch_all(
    builder: &RequestBuilder,
    urls: &[String],
    batch_size: usize,
    max_concurrency: usize,
) -> Vec<(String, Option<Response>)> {
    let batch_size = batch_size.max(1);
    let max_concurrency = max_concurrency.max(1);
    let mut results = Vec::with_capacity(urls.len());

    for (index, batch) in urls.chunks(batch_size).enumerate() {
        info!(batch = index, size = batch.len(), "fetching batch");

        let fetched: Vec<(String, Option<Response>)> = stream::iter(batch.iter().cloned())
            .map(|url| async move {
                let options = PageOptions::for_url(&url);
                match builder.fetch(&url, &options).await {
                    Ok(response) => (url, response),
                    Err(e) => {
                        warn!(url = %url, error = %e, "bulk fetch failed");
                        (url, None)
                    }
                }
            })
            .buffered(max_concurrency)
            .collect()
            .await;

        results.extend(fetched);
    }

    results
}
