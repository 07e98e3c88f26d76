//! The top-level acquisition entry point
//!
//! [`RemoteUrl`] ties the pipeline together: resolve a handler for the
//! link, fetch through the request builder, classify the response into a
//! page variant, and aggregate everything into one flat property map.
//! Every accessor degrades to an empty value on failure; only retry
//! exhaustion surfaces as an error.

use serde_json::Value;
use tracing::debug;

use crate::content::{ContentPage, Page, PageFactory, Properties};
use crate::crawler::builder::RequestBuilder;
use crate::crawler::request::Response;
use crate::handlers::{Handler, HandlerRegistry};
use crate::utils::error::FetchError;

/// One URL being acquired.
pub struct RemoteUrl {
    original_url: String,
    handler: Handler,
}

impl RemoteUrl {
    /// Resolve a link against the default handler registry.
    pub fn new(url: &str) -> Self {
        Self::with_registry(url, &HandlerRegistry::default())
    }

    /// Resolve a link against an explicit registry.
    pub fn with_registry(url: &str, registry: &HandlerRegistry) -> Self {
        Self {
            original_url: url.to_string(),
            handler: registry.resolve(url),
        }
    }

    /// The link as originally given.
    pub fn original_url(&self) -> &str {
        &self.original_url
    }

    /// The canonical URL after handler resolution.
    pub fn url(&self) -> &str {
        self.handler.url()
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Fetch the resource (memoized; see [`Handler::get_response`]).
    pub async fn get_response(
        &mut self,
        builder: &RequestBuilder,
    ) -> Result<Option<&Response>, FetchError> {
        self.handler.get_response(builder).await
    }

    /// Fetch and classify. `Ok(None)` when the resource is dead or the
    /// response is binary.
    pub async fn page(&mut self, builder: &RequestBuilder) -> Result<Option<Page>, FetchError> {
        let Some(response) = self.handler.get_response(builder).await? else {
            return Ok(None);
        };
        let url = response.url.clone();
        let content_type = response.content_type().map(str::to_string);
        let text = response.text.clone();
        Ok(PageFactory::get(&url, content_type.as_deref(), &text))
    }

    /// Feed URLs for this resource: the handler's site-specific
    /// derivation, completed by autodiscovery from the fetched page.
    pub async fn feeds(&mut self, builder: &RequestBuilder) -> Vec<String> {
        let page = self.page(builder).await.unwrap_or_default();

        let mut feeds = self.handler.feeds();
        if let Some(page) = page {
            for feed in page.feeds() {
                if !feeds.contains(&feed) {
                    feeds.push(feed);
                }
            }
        }
        feeds
    }

    /// Aggregate all extractable facts into one flat property map.
    ///
    /// Dead resources yield a minimal map (link + handler identity).
    ///
    /// # Errors
    ///
    /// `FetchError::RetryExhausted` - the only failure that propagates.
    pub async fn properties(
        &mut self,
        builder: &RequestBuilder,
    ) -> Result<Properties, FetchError> {
        let response = match self.handler.get_response(builder).await? {
            Some(response) => {
                let url = response.url.clone();
                let status = response.status_code;
                let crawler = response.crawler.clone();
                let content_type = response.content_type().map(str::to_string);
                let text = response.text.clone();
                Some((url, status, crawler, content_type, text))
            }
            None => None,
        };

        let mut props = Properties::new();
        props.insert(
            "link".into(),
            Value::String(self.handler.url().to_string()),
        );
        props.insert(
            "handler".into(),
            Value::String(self.handler.kind().name().to_string()),
        );
        if let Some(code) = self.handler.code() {
            props.insert("code".into(), Value::String(code.to_string()));
        }

        let Some((url, status, crawler, content_type, text)) = response else {
            debug!(url = %self.handler.url(), "no response, minimal properties");
            props.insert("dead".into(), Value::Bool(true));
            return Ok(props);
        };

        props.insert("status_code".into(), Value::from(status));
        props.insert("crawler".into(), Value::String(crawler));

        let mut feeds = self.handler.feeds();
        if let Some(page) = PageFactory::get(&url, content_type.as_deref(), &text) {
            let page_props = page.properties();
            for (key, value) in page_props {
                props.entry(key).or_insert(value);
            }
            props.insert(
                "contents_hash".into(),
                Value::String(page.contents_hash()),
            );
            props.insert(
                "contents_body_hash".into(),
                Value::String(page.contents_body_hash()),
            );
            for feed in page.feeds() {
                if !feeds.contains(&feed) {
                    feeds.push(feed);
                }
            }
        }

        props.insert(
            "feeds".into(),
            Value::Array(feeds.into_iter().map(Value::String).collect()),
        );

        // The canonical resource URL wins over whatever the page body said.
        props.insert(
            "link".into(),
            Value::String(self.handler.url().to_string()),
        );

        Ok(props)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::crawler::backend::CrawlerBackend;
    use crate::crawler::options::CrawlerKind;
    use crate::crawler::request::Request;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;

    const HTML: &str = r#"<html lang="en"><head>
<title>A Page</title>
<meta property="og:title" content="OG Page"/>
<meta property="og:description" content="About things"/>
<link rel="alternate" type="application/rss+xml" href="/feed.xml"/>
</head><body><p>hi</p></body></html>"#;

    struct HtmlBackend;

    #[async_trait]
    impl CrawlerBackend for HtmlBackend {
        fn kind(&self) -> CrawlerKind {
            CrawlerKind::Http
        }

        fn name(&self) -> &'static str {
            "static-html"
        }

        async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
            let mut headers = HashMap::new();
            headers.insert(
                "content-type".to_string(),
                "text/html; charset=utf-8".to_string(),
            );
            Ok(Response {
                url: request.url.clone(),
                status_code: 200,
                headers,
                binary: HTML.as_bytes().to_vec(),
                text: HTML.to_string(),
                encoding: Some("utf-8".to_string()),
                crawler: "static-html".to_string(),
            })
        }
    }

    fn builder_with_html() -> RequestBuilder {
        let mut builder = RequestBuilder::new(&Config::default()).unwrap();
        builder.register(Arc::new(HtmlBackend));
        builder
    }

    #[tokio::test]
    async fn test_properties_aggregation() {
        let builder = builder_with_html();
        let mut remote = RemoteUrl::new("https://example.com/post?utm_source=news");

        let props = remote.properties(&builder).await.unwrap();
        assert_eq!(props["link"], "https://example.com/post");
        assert_eq!(props["handler"], "http");
        assert_eq!(props["title"], "OG Page");
        assert_eq!(props["status_code"], 200);
        assert_eq!(props["crawler"], "static-html");
        assert!(props.contains_key("contents_hash"));
        assert!(props.contains_key("date_published"));

        let feeds = props["feeds"].as_array().unwrap();
        assert_eq!(feeds[0], "https://example.com/feed.xml");
    }

    #[tokio::test]
    async fn test_feeds_from_autodiscovery() {
        let builder = builder_with_html();
        let mut remote = RemoteUrl::new("https://example.com/blog");
        let feeds = remote.feeds(&builder).await;
        assert_eq!(feeds, vec!["https://example.com/feed.xml"]);
    }

    struct FailingBackend;

    #[async_trait]
    impl CrawlerBackend for FailingBackend {
        fn kind(&self) -> CrawlerKind {
            CrawlerKind::Http
        }

        fn name(&self) -> &'static str {
            "failing"
        }

        async fn fetch(&self, _request: &Request) -> Result<Response, FetchError> {
            Err(FetchError::Timeout)
        }
    }

    #[tokio::test]
    async fn test_dead_resource_minimal_properties() {
        let mut builder = RequestBuilder::new(&Config::default()).unwrap();
        builder.register(Arc::new(FailingBackend));

        let mut remote = RemoteUrl::new("https://example.com/gone");
        let props = remote.properties(&builder).await.unwrap();
        assert_eq!(props["link"], "https://example.com/gone");
        assert_eq!(props["dead"], true);
        assert!(!props.contains_key("title"));
    }
}
