//! Integration tests for the domain policy cache using wiremock

mod common;

use common::{test_config, SAMPLE_ROBOTS};
use lodestone::crawler::RequestBuilder;
use lodestone::policy::DomainPolicyCache;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_robots_fetched_once_per_domain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_ROBOTS))
        .expect(1) // second access must come from the cache
        .mount(&server)
        .await;

    let builder = RequestBuilder::new(&test_config()).unwrap();
    let cache = DomainPolicyCache::new(16);

    let url_private = format!("{}/private/x", server.uri());
    let url_open = format!("{}/open", server.uri());

    assert!(!cache.is_allowed(&builder, &url_private).await);
    assert!(cache.is_allowed(&builder, &url_open).await);
    assert!(
        cache
            .is_allowed(&builder, &format!("{}/private/open/y", server.uri()))
            .await
    );
}

#[tokio::test]
async fn test_sitemaps_harvested_by_line_scan() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_ROBOTS))
        .mount(&server)
        .await;

    let builder = RequestBuilder::new(&test_config()).unwrap();
    let cache = DomainPolicyCache::new(16);

    let sitemaps = cache
        .sitemaps(&builder, &format!("{}/anything", server.uri()))
        .await;
    assert_eq!(sitemaps, vec!["https://sample.test/sitemap.xml"]);
}

#[tokio::test]
async fn test_missing_robots_allows_everything() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let builder = RequestBuilder::new(&test_config()).unwrap();
    let cache = DomainPolicyCache::new(16);

    assert!(
        cache
            .is_allowed(&builder, &format!("{}/private/x", server.uri()))
            .await
    );
}
