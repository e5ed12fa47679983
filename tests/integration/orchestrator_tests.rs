//! Orchestrator and cache behavior against a mock hosting service

use crate::fixtures::*;
use repo_census::cache::{MemoryCache, ResultCache};
use repo_census::{census, CensusError, ScrapeError, ScrapeOrchestrator};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_root(server: &MockServer, expected_hits: u64, delay: Duration) {
    Mock::given(method("GET"))
        .and(path("/octo/demo"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(demo_root_listing())
                .set_delay(delay),
        )
        .expect(expected_hits)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_second_request_is_served_from_cache() {
    let server = MockServer::start().await;
    mount_root(&server, 1, Duration::ZERO).await;
    mount_demo_subtrees(&server).await;

    let cache = Arc::new(MemoryCache::new());
    let orchestrator =
        ScrapeOrchestrator::new(walker_for(&test_config(&server.uri())), cache.clone());

    let first = orchestrator.get_result("octo/demo").await.unwrap();
    let second = orchestrator.get_result("octo/demo").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(cache.get("octo/demo").unwrap(), Some(first));
}

#[tokio::test]
async fn test_concurrent_requests_share_one_walk() {
    let server = MockServer::start().await;
    mount_root(&server, 1, Duration::from_millis(300)).await;
    mount_demo_subtrees(&server).await;

    let orchestrator = ScrapeOrchestrator::new(
        walker_for(&test_config(&server.uri())),
        Arc::new(MemoryCache::new()),
    );

    let (a, b, c) = tokio::join!(
        orchestrator.get_result("octo/demo"),
        orchestrator.get_result("octo/demo"),
        orchestrator.get_result("/octo/demo/"),
    );

    let a = a.unwrap();
    assert_eq!(a, b.unwrap());
    assert_eq!(a, c.unwrap());
    assert_eq!(orchestrator.in_flight_count(), 0);
}

#[tokio::test]
async fn test_refresh_walks_again() {
    let server = MockServer::start().await;
    mount_root(&server, 2, Duration::ZERO).await;
    mount_demo_subtrees(&server).await;

    let orchestrator = ScrapeOrchestrator::new(
        walker_for(&test_config(&server.uri())),
        Arc::new(MemoryCache::new()),
    );

    let first = orchestrator.get_result("octo/demo").await.unwrap();
    let refreshed = orchestrator.refresh("octo/demo").await.unwrap();
    let cached = orchestrator.get_result("octo/demo").await.unwrap();

    assert_eq!(first, refreshed);
    assert_eq!(refreshed, cached);
}

#[tokio::test]
async fn test_failed_walk_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/octo/demo"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let cache = Arc::new(MemoryCache::new());
    let orchestrator =
        ScrapeOrchestrator::new(walker_for(&test_config(&server.uri())), cache.clone());

    for _ in 0..2 {
        let err = orchestrator.get_result("octo/demo").await.unwrap_err();
        assert!(matches!(err, ScrapeError::Fetch(_)));
    }

    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_census_reuses_sqlite_cache_across_runs() {
    let server = MockServer::start().await;
    mount_root(&server, 1, Duration::ZERO).await;
    mount_demo_subtrees(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&server.uri());
    config.cache.database_path = Some(dir.path().join("cache.db").to_string_lossy().to_string());

    let first = census(&config, "octo/demo", false).await.unwrap();
    let second = census(&config, "octo/demo", false).await.unwrap();

    assert_eq!(first, second);
    let md = first.iter().find(|b| b.extension == "md").unwrap();
    assert_eq!(md.total_line_count, 12);
    assert_eq!(md.total_size_bytes, 3_200.0);
}

#[tokio::test]
async fn test_census_rejects_invalid_repository() {
    let config = test_config("http://127.0.0.1:9/");
    let err = census(&config, "just-a-name", false).await.unwrap_err();
    assert!(matches!(
        err,
        CensusError::Scrape(ScrapeError::InvalidRepository(_))
    ));
}
