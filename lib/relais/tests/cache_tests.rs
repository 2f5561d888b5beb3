//! Integration tests for conditional-GET caching.
//!
//! Conditional mocks are mounted before the unconditional fallbacks:
//! wiremock serves the first mounted mock that matches.

use std::sync::Arc;

use relais::cache::{CacheError, CacheKey, CachedResponse, ResponseCache};
use relais::prelude::*;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, header_exists, method, path},
};

/// Test the miss-then-revalidate flow: the second request carries
/// If-None-Match and a 304 reply is answered from the cached snapshot.
#[tokio::test]
async fn test_miss_then_revalidate() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/resource"))
        .and(header("If-None-Match", "\"v1\""))
        .respond_with(ResponseTemplate::new(304))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/resource"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"v1\"")
                .set_body_json(serde_json::json!({"v": 1})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::builder(mock_server.uri())
        .cached()
        .build()
        .expect("client");

    let first = client.get("/resource").await.expect("first");
    assert_eq!(first.status(), 200);
    assert_eq!(first.document(), Some(&serde_json::json!({"v": 1})));

    // Served from the snapshot: stored status and body, not 304/empty
    let second = client.get("/resource").await.expect("second");
    assert_eq!(second.status(), 200);
    assert_eq!(second.document(), Some(&serde_json::json!({"v": 1})));
}

/// Test that a changed resource supersedes the snapshot and its validator.
#[tokio::test]
async fn test_revalidation_replaces_snapshot() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/resource"))
        .and(header("If-None-Match", "\"v1\""))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"v2\"")
                .set_body_json(serde_json::json!({"v": 2})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/resource"))
        .and(header("If-None-Match", "\"v2\""))
        .respond_with(ResponseTemplate::new(304))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/resource"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"v1\"")
                .set_body_json(serde_json::json!({"v": 1})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::builder(mock_server.uri())
        .cached()
        .build()
        .expect("client");

    let first = client.get("/resource").await.expect("first");
    assert_eq!(first.document(), Some(&serde_json::json!({"v": 1})));

    // The resource changed: the live reply wins and replaces the snapshot
    let second = client.get("/resource").await.expect("second");
    assert_eq!(second.document(), Some(&serde_json::json!({"v": 2})));

    // The new validator is used, and the new snapshot served on 304
    let third = client.get("/resource").await.expect("third");
    assert_eq!(third.document(), Some(&serde_json::json!({"v": 2})));
}

/// Test that non-GET requests never become conditional.
#[tokio::test]
async fn test_non_get_is_not_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/things"))
        .and(header_exists("If-None-Match"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/things"))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("ETag", "\"v1\"")
                .set_body_json(serde_json::json!({"ok": true})),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = ApiClient::builder(mock_server.uri())
        .cached()
        .build()
        .expect("client");

    let payload = serde_json::json!({"a": 1});
    for _ in 0..2 {
        let response = client.post("/things", &payload).await.expect("response");
        assert_eq!(response.status(), 201);
    }
}

/// Test that replies without an ETag are fetched in full every time.
#[tokio::test]
async fn test_no_validator_means_no_conditional() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/volatile"))
        .and(header_exists("If-None-Match"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/volatile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"t": 1})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = ApiClient::builder(mock_server.uri())
        .cached()
        .build()
        .expect("client");

    for _ in 0..2 {
        let response = client.get("/volatile").await.expect("response");
        assert!(response.is_success());
    }
}

/// Test that query strings keep cache entries apart.
#[tokio::test]
async fn test_query_string_separates_entries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pages"))
        .and(header_exists("If-None-Match"))
        .respond_with(ResponseTemplate::new(304))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pages"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"p\"")
                .set_body_json(serde_json::json!({"items": []})),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = ApiClient::builder(mock_server.uri())
        .cached()
        .build()
        .expect("client");

    // Different query strings are different cache entries: both requests
    // are unconditional misses.
    client.get("/pages?page=1").await.expect("page 1");
    client.get("/pages?page=2").await.expect("page 2");
}

/// Store that fails every operation.
struct BrokenStore;

impl ResponseCache for BrokenStore {
    fn get(&self, _key: &CacheKey) -> std::result::Result<Option<CachedResponse>, CacheError> {
        Err("store is down".into())
    }

    fn set(
        &self,
        _key: CacheKey,
        _response: CachedResponse,
    ) -> std::result::Result<(), CacheError> {
        Err("store is down".into())
    }
}

/// Test that a failing store degrades to uncached operation.
#[tokio::test]
async fn test_broken_store_fails_open() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/resource"))
        .and(header_exists("If-None-Match"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/resource"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"v1\"")
                .set_body_json(serde_json::json!({"v": 1})),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = ApiClient::builder(mock_server.uri())
        .cached_with(Arc::new(BrokenStore))
        .build()
        .expect("client");

    for _ in 0..2 {
        let response = client.get("/resource").await.expect("response");
        assert_eq!(response.status(), 200);
        assert_eq!(response.document(), Some(&serde_json::json!({"v": 1})));
    }
}

/// Test that metadata is recomputed for snapshot-served responses.
#[tokio::test]
async fn test_snapshot_response_carries_metadata() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/resource"))
        .and(header("If-None-Match", "\"v1\""))
        .respond_with(ResponseTemplate::new(304))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/resource"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"v1\"")
                .insert_header("X-RateLimit-Limit", "60")
                .set_body_json(serde_json::json!({"v": 1})),
        )
        .mount(&mock_server)
        .await;

    let client = ApiClient::builder(mock_server.uri())
        .cached()
        .build()
        .expect("client");

    client.get("/resource").await.expect("first");

    let second = client.get("/resource").await.expect("second");
    let info = second.api_info().expect("api info");
    assert_eq!(info.etag.as_deref(), Some("\"v1\""));
    assert_eq!(info.rate_limit, 60);
}
