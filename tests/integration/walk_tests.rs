//! Tree walker tests against a mock hosting service

use crate::fixtures::*;
use repo_census::aggregate;
use repo_census::crawler::FileEntry;
use repo_census::{FetchError, ParseError, ScrapeError};
use wiremock::matchers::{method, path};
use std::time::Duration;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn find<'a>(entries: &'a [FileEntry], name: &str) -> &'a FileEntry {
    entries
        .iter()
        .find(|e| e.name == name)
        .unwrap_or_else(|| panic!("{} not found in walk output", name))
}

#[tokio::test]
async fn test_walk_demo_repository() {
    let server = MockServer::start().await;
    mount_demo_repository(&server).await;

    let walker = walker_for(&test_config(&server.uri()));
    let entries = walker.walk("/octo/demo").await.expect("Walk failed");

    assert_eq!(entries.len(), 3);

    let readme = find(&entries, "README.md");
    assert_eq!(
        *readme,
        FileEntry {
            name: "README.md".to_string(),
            content_url: "/octo/demo/blob/main/README.md".to_string(),
            line_count: 12,
            size_bytes: 3_200.0,
            extension: "md".to_string(),
        }
    );

    let main = find(&entries, "main.rs");
    assert_eq!(main.line_count, 40);
    assert_eq!(main.size_bytes, 1_500.0);
    assert_eq!(main.extension, "rs");

    // Depth-first listing order: src/ comes before README.md in the root
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["main.rs", "lib.rs", "README.md"]);

    let buckets = aggregate(&entries);
    let extensions: Vec<_> = buckets.iter().map(|b| b.extension.as_str()).collect();
    assert_eq!(extensions, vec!["rs", "md"]);

    assert_eq!(buckets[0].total_line_count, 120);
    assert_eq!(buckets[0].total_size_bytes, 3_500.0);
    assert_eq!(buckets[1].total_line_count, 12);
    assert_eq!(buckets[1].total_size_bytes, 3_200.0);
}

#[tokio::test]
async fn test_walk_sequential_matches_concurrent() {
    let server = MockServer::start().await;
    mount_demo_repository(&server).await;

    let concurrent = walker_for(&test_config(&server.uri()))
        .walk("/octo/demo")
        .await
        .unwrap();

    let mut config = test_config(&server.uri());
    config.scraper.max_concurrent_fetches = 1;
    let sequential = walker_for(&config).walk("/octo/demo").await.unwrap();

    let names: Vec<_> = sequential.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["main.rs", "lib.rs", "README.md"]);

    assert_eq!(concurrent, sequential);
    assert_eq!(aggregate(&concurrent), aggregate(&sequential));
}

#[tokio::test]
async fn test_walk_order_ignores_fetch_timing() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/octo/mixed",
        listing_page(&[
            ("a", "/octo/mixed/tree/main/a"),
            ("b", "/octo/mixed/tree/main/b"),
        ]),
    )
    .await;
    // The first directory answers slowly so its files arrive last
    Mock::given(method("GET"))
        .and(path("/octo/mixed/tree/main/a"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(&[("x.py", "/octo/mixed/blob/main/a/x.py")]))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/octo/mixed/tree/main/b",
        listing_page(&[("y.rs", "/octo/mixed/blob/main/b/y.rs")]),
    )
    .await;
    mount_page(&server, "/octo/mixed/blob/main/a/x.py", file_page(4, "400 Bytes")).await;
    mount_page(&server, "/octo/mixed/blob/main/b/y.rs", file_page(6, "600 Bytes")).await;

    for concurrency in [1, 8] {
        let mut config = test_config(&server.uri());
        config.scraper.max_concurrent_fetches = concurrency;
        let entries = walker_for(&config).walk("/octo/mixed").await.unwrap();

        let extensions: Vec<_> = aggregate(&entries)
            .into_iter()
            .map(|b| b.extension)
            .collect();
        assert_eq!(extensions, vec!["py", "rs"], "concurrency {}", concurrency);
    }
}

#[tokio::test]
async fn test_empty_listing_yields_nothing() {
    let server = MockServer::start().await;
    mount_page(&server, "/octo/empty", listing_page(&[])).await;

    let walker = walker_for(&test_config(&server.uri()));
    let entries = walker.walk("/octo/empty").await.unwrap();

    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_missing_page_aborts_walk() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/octo/broken",
        listing_page(&[
            ("gone", "/octo/broken/tree/main/gone"),
            ("README.md", "/octo/broken/blob/main/README.md"),
        ]),
    )
    .await;
    mount_page(
        &server,
        "/octo/broken/blob/main/README.md",
        file_page(3, "120 Bytes"),
    )
    .await;
    // /octo/broken/tree/main/gone is not mounted: wiremock answers 404

    let walker = walker_for(&test_config(&server.uri()));
    let err = walker.walk("/octo/broken").await.unwrap_err();

    assert!(
        matches!(err, ScrapeError::Fetch(FetchError::Status { status: 404, .. })),
        "unexpected error: {}",
        err
    );
}

#[tokio::test]
async fn test_server_error_on_root() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/octo/demo"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let walker = walker_for(&test_config(&server.uri()));
    let err = walker.walk("/octo/demo").await.unwrap_err();

    assert!(matches!(
        err,
        ScrapeError::Fetch(FetchError::Status { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_missing_size_header_counts_zero_bytes() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/octo/plain",
        listing_page(&[("Makefile", "/octo/plain/blob/main/Makefile")]),
    )
    .await;
    mount_page(
        &server,
        "/octo/plain/blob/main/Makefile",
        file_page_without_header(7),
    )
    .await;

    let walker = walker_for(&test_config(&server.uri()));
    let entries = walker.walk("/octo/plain").await.unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].line_count, 7);
    assert_eq!(entries[0].size_bytes, 0.0);
    assert_eq!(entries[0].extension, "Makefile");
}

#[tokio::test]
async fn test_missing_size_header_strict_mode_fails() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/octo/plain",
        listing_page(&[("Makefile", "/octo/plain/blob/main/Makefile")]),
    )
    .await;
    mount_page(
        &server,
        "/octo/plain/blob/main/Makefile",
        file_page_without_header(7),
    )
    .await;

    let mut config = test_config(&server.uri());
    config.scraper.strict_size_header = true;
    let err = walker_for(&config).walk("/octo/plain").await.unwrap_err();

    match err {
        ScrapeError::Parse { path, source } => {
            assert_eq!(path, "/octo/plain/blob/main/Makefile");
            assert!(matches!(source, ParseError::MissingNode(_)));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_malformed_size_header_fails() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/octo/odd",
        listing_page(&[("odd.txt", "/octo/odd/blob/main/odd.txt")]),
    )
    .await;
    mount_page(
        &server,
        "/octo/odd/blob/main/odd.txt",
        file_page(2, "lots of bytes"),
    )
    .await;

    let walker = walker_for(&test_config(&server.uri()));
    let err = walker.walk("/octo/odd").await.unwrap_err();

    assert!(matches!(
        err,
        ScrapeError::Parse {
            source: ParseError::Unit(_),
            ..
        }
    ));
}

#[tokio::test]
async fn test_max_depth_skips_deeper_directories() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/octo/deep",
        listing_page(&[("a", "/octo/deep/tree/main/a")]),
    )
    .await;
    mount_page(
        &server,
        "/octo/deep/tree/main/a",
        listing_page(&[
            ("a.rs", "/octo/deep/blob/main/a/a.rs"),
            ("b", "/octo/deep/tree/main/a/b"),
        ]),
    )
    .await;
    mount_page(
        &server,
        "/octo/deep/blob/main/a/a.rs",
        file_page(5, "100 Bytes"),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/octo/deep/tree/main/a/b"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[])))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri());
    config.scraper.max_depth = 1;
    let entries = walker_for(&config).walk("/octo/deep").await.unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "a.rs");
}

#[tokio::test]
async fn test_duplicate_links_are_walked_once() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/octo/dup",
        listing_page(&[
            ("lib", "/octo/dup/tree/main/lib"),
            ("lib", "/octo/dup/tree/main/lib"),
            ("x.rs", "/octo/dup/blob/main/x.rs"),
            ("x.rs", "/octo/dup/blob/main/x.rs"),
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/octo/dup/tree/main/lib"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/octo/dup/blob/main/x.rs"))
        .respond_with(ResponseTemplate::new(200).set_body_string(file_page(9, "1 KB")))
        .expect(1)
        .mount(&server)
        .await;

    let walker = walker_for(&test_config(&server.uri()));
    let entries = walker.walk("/octo/dup").await.unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].line_count, 9);
    assert_eq!(entries[0].size_bytes, 1_000.0);
}
