//! Page builders and mock server helpers shared by the integration tests

use repo_census::config::Config;
use repo_census::crawler::{build_walker, TreeWalker};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
pub fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.scraper.base_url = base_url.to_string();
    config.scraper.request_timeout_secs = 5;
    config.scraper.connect_timeout_secs = 2;
    config.user_agent.crawler_name = "TestCensus".to_string();
    config
}

pub fn walker_for(config: &Config) -> TreeWalker {
    build_walker(config).expect("Failed to build walker")
}

/// A directory listing page with one row per `(name, href)`
pub fn listing_page(rows: &[(&str, &str)]) -> String {
    let rows: String = rows
        .iter()
        .map(|(name, href)| {
            format!(
                r#"<div role="row" class="Box-row">
                    <div role="gridcell"><svg aria-label="icon"></svg></div>
                    <div role="rowheader"><span><a class="js-navigation-open" href="{}">{}</a></span></div>
                    <div role="gridcell">Initial commit</div>
                </div>"#,
                href, name
            )
        })
        .collect();

    format!(
        r#"<html><head><title>listing</title></head><body>
        <div class="Box" aria-labelledby="files">
            <div class="Box-row Box-row--focus-gray">..</div>
            {}
        </div>
        </body></html>"#,
        rows
    )
}

/// A file detail page with `lines` numbered content rows and a size header
pub fn file_page(lines: u64, size_text: &str) -> String {
    format!(
        r#"<html><body>
        <div class="Box-header">
            <div class="text-mono f6">
                {} lines ({} sloc)
                <span class="file-info-divider"></span>
                {}
            </div>
        </div>
        {}
        </body></html>"#,
        lines,
        lines,
        size_text,
        content_table(lines)
    )
}

/// A file detail page that lacks the size header
pub fn file_page_without_header(lines: u64) -> String {
    format!("<html><body>{}</body></html>", content_table(lines))
}

fn content_table(lines: u64) -> String {
    let rows: String = (1..=lines)
        .map(|n| {
            format!(
                r#"<tr><td id="L{0}" class="blob-num" data-line-number="{0}"></td><td class="blob-code">line {0}</td></tr>"#,
                n
            )
        })
        .collect();

    format!(r#"<table class="highlight"><tbody>{}</tbody></table>"#, rows)
}

/// Serves `body` for GET `page_path`
pub async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Mounts the demo repository used across tests:
///
/// ```text
/// /octo/demo
/// ├── src/
/// │   ├── main.rs   (40 lines, 1.5 KB)
/// │   └── lib.rs    (80 lines, 2 KB)
/// ├── docs/         (empty)
/// └── README.md     (12 lines, 3.2 KB)
/// ```
///
/// The root listing is not mounted so tests can attach expectations to it.
pub async fn mount_demo_subtrees(server: &MockServer) {
    mount_page(
        server,
        "/octo/demo/tree/main/src",
        listing_page(&[
            ("main.rs", "/octo/demo/blob/main/src/main.rs"),
            ("lib.rs", "/octo/demo/blob/main/src/lib.rs"),
        ]),
    )
    .await;
    mount_page(server, "/octo/demo/tree/main/docs", listing_page(&[])).await;
    mount_page(
        server,
        "/octo/demo/blob/main/README.md",
        file_page(12, "3.2 KB"),
    )
    .await;
    mount_page(
        server,
        "/octo/demo/blob/main/src/main.rs",
        file_page(40, "1.5 KB"),
    )
    .await;
    mount_page(
        server,
        "/octo/demo/blob/main/src/lib.rs",
        file_page(80, "2 KB"),
    )
    .await;
}

pub fn demo_root_listing() -> String {
    listing_page(&[
        ("src", "/octo/demo/tree/main/src"),
        ("docs", "/octo/demo/tree/main/docs"),
        ("README.md", "/octo/demo/blob/main/README.md"),
    ])
}

/// Mounts the full demo repository including its root listing
pub async fn mount_demo_repository(server: &MockServer) {
    mount_page(server, "/octo/demo", demo_root_listing()).await;
    mount_demo_subtrees(server).await;
}
