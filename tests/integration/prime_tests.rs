//! Integration tests for the primer
//!
//! These tests use wiremock to serve sitemaps and pages and check the full
//! resolve-sort-prime cycle end-to-end.

use cache_primer::config::{LocalCacheConfig, RunConfig};
use cache_primer::output::AuditLog;
use cache_primer::{resolve_and_prime, Mode, Primer, PrimerError, RunOutcome, SitemapError, Source};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER_AGENT: &str = "TestPrimer/1.0";

/// Creates a quiet test configuration with the given throttle
fn create_test_config(throttle: usize) -> RunConfig {
    RunConfig {
        throttle,
        user_agent: USER_AGENT.to_string(),
        request_timeout_secs: 5,
        warnings: false,
        ..RunConfig::default()
    }
}

/// Builds a leaf sitemap from (url, priority) pairs
fn urlset(entries: &[(String, f64)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#,
    );
    for (loc, priority) in entries {
        xml.push_str(&format!(
            "\n<url>\n    <loc>{}</loc>\n    <priority>{:.1}</priority>\n</url>",
            loc, priority
        ));
    }
    xml.push_str("\n</urlset>");
    xml
}

/// Builds a sitemap index from child locations
fn sitemapindex(children: &[String]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#,
    );
    for child in children {
        xml.push_str(&format!("\n<sitemap>\n    <loc>{}</loc>\n</sitemap>", child));
    }
    xml.push_str("\n</sitemapindex>");
    xml
}

fn gzip(data: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

async fn mount_sitemap(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("user-agent", USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, route: &str, status: u16, expected: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("user-agent", USER_AGENT))
        .respond_with(ResponseTemplate::new(status).set_body_string("<html>ok</html>"))
        .expect(expected)
        .mount(server)
        .await;
}

/// Paths of all requests the server received, excluding sitemap documents
async fn page_requests(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .expect("request recording is enabled")
        .iter()
        .map(|request| request.url.path().to_string())
        .filter(|p| !p.ends_with(".xml") && !p.ends_with(".gz"))
        .collect()
}

fn abc_sitemap(base_url: &str) -> String {
    urlset(&[
        (format!("{}/a", base_url), 0.4),
        (format!("{}/b", base_url), 0.6),
        (format!("{}/c", base_url), 1.0),
    ])
}

#[tokio::test]
async fn test_primes_in_priority_order() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_sitemap(&mock_server, "/sitemap.xml", abc_sitemap(&base_url)).await;
    for page in ["/a", "/b", "/c"] {
        mount_page(&mock_server, page, 200, 1).await;
    }

    let outcome = resolve_and_prime(
        create_test_config(1),
        Source::Sitemap(format!("{}/sitemap.xml", base_url)),
        Mode::Prime,
    )
    .await
    .expect("Priming failed");

    let report = match outcome {
        RunOutcome::Primed(report) => report,
        RunOutcome::Listed(_) => panic!("prime mode must prime"),
    };
    assert!(!report.stopped_early);
    assert_eq!(report.summary.total, 3);
    assert_eq!(report.summary.requested, 3);
    assert_eq!(report.summary.failed, 0);

    // With a throttle of 1 each page finishes before the next one starts
    assert_eq!(page_requests(&mock_server).await, vec!["/c", "/b", "/a"]);
}

#[tokio::test]
async fn test_print_mode_lists_without_priming() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_sitemap(&mock_server, "/sitemap.xml", abc_sitemap(&base_url)).await;
    for page in ["/a", "/b", "/c"] {
        mount_page(&mock_server, page, 200, 0).await;
    }

    let outcome = resolve_and_prime(
        create_test_config(1),
        Source::Sitemap(format!("{}/sitemap.xml", base_url)),
        Mode::Print,
    )
    .await
    .expect("Listing failed");

    let urls = match outcome {
        RunOutcome::Listed(urls) => urls,
        RunOutcome::Primed(_) => panic!("print mode must not prime"),
    };

    let mut out = Vec::new();
    cache_primer::output::write_url_listing(&mut out, &urls).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        format!("{0}/c\n{0}/b\n{0}/a\n", base_url)
    );
}

#[tokio::test]
async fn test_sitemap_index_with_gzip_and_failing_child() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_sitemap(
        &mock_server,
        "/child1.xml",
        urlset(&[(format!("{}/one", base_url), 0.5)]),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/child2.xml.gz"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(gzip(&urlset(&[(format!("{}/two", base_url), 0.9)]))),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    mount_sitemap(
        &mock_server,
        "/index.xml",
        sitemapindex(&[
            format!("{}/child1.xml", base_url),
            format!("{}/missing.xml", base_url),
            format!("{}/child2.xml.gz", base_url),
        ]),
    )
    .await;

    let outcome = resolve_and_prime(
        create_test_config(2),
        Source::Sitemap(format!("{}/index.xml", base_url)),
        Mode::Print,
    )
    .await
    .expect("Index resolution failed");

    let urls = match outcome {
        RunOutcome::Listed(urls) => urls,
        RunOutcome::Primed(_) => panic!("print mode must not prime"),
    };
    let locations: Vec<String> = urls.into_iter().map(|u| u.location).collect();
    assert_eq!(
        locations,
        vec![format!("{}/two", base_url), format!("{}/one", base_url)]
    );
}

#[tokio::test]
async fn test_gzipped_sitemap_with_content_encoding() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml.gz"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Encoding", "gzip")
                .set_body_bytes(gzip(&abc_sitemap(&base_url))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let outcome = resolve_and_prime(
        create_test_config(1),
        Source::Sitemap(format!("{}/sitemap.xml.gz", base_url)),
        Mode::Print,
    )
    .await
    .expect("Sitemap with Content-Encoding was not decoded");

    let RunOutcome::Listed(urls) = outcome else {
        panic!("print mode must not prime");
    };
    assert_eq!(urls.len(), 3);
    assert_eq!(urls[0].location, format!("{}/c", base_url));
}

#[tokio::test]
async fn test_root_sitemap_failure_aborts() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let result = resolve_and_prime(
        create_test_config(1),
        Source::Sitemap(format!("{}/sitemap.xml", base_url)),
        Mode::Prime,
    )
    .await;

    match result {
        Err(PrimerError::Sitemap(e @ SitemapError::Status { .. })) => {
            assert_eq!(e.to_string(), "HTTP 404 Not Found");
        }
        other => panic!("expected an HTTP status error, got {:?}", other),
    }
    assert!(page_requests(&mock_server).await.is_empty());
}

#[tokio::test]
async fn test_local_cache_hit_skips_request() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let cache_dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(cache_dir.path().join("cached")).unwrap();
    std::fs::write(cache_dir.path().join("cached/index.html"), "<html></html>").unwrap();
    std::fs::create_dir_all(cache_dir.path().join("café")).unwrap();
    std::fs::write(cache_dir.path().join("café/index.html"), "<html></html>").unwrap();

    mount_page(&mock_server, "/cached/", 200, 0).await;
    mount_page(&mock_server, "/caf%C3%A9/", 200, 0).await;
    mount_page(&mock_server, "/fresh/", 200, 1).await;

    let config = RunConfig {
        local_cache: Some(LocalCacheConfig::new(cache_dir.path(), "index.html")),
        ..create_test_config(2)
    };

    let outcome = resolve_and_prime(
        config,
        Source::Urls(vec![
            format!("{}/cached/", base_url),
            format!("{}/caf%C3%A9/", base_url),
            format!("{}/fresh/", base_url),
        ]),
        Mode::Prime,
    )
    .await
    .expect("Priming failed");

    let RunOutcome::Primed(report) = outcome else {
        panic!("prime mode must prime");
    };
    assert_eq!(report.summary.cached, 2);
    assert_eq!(report.summary.requested, 1);
    assert_eq!(page_requests(&mock_server).await, vec!["/fresh/"]);
}

#[tokio::test]
async fn test_failed_pages_do_not_abort_others() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/broken", 500, 1).await;
    mount_page(&mock_server, "/gone", 404, 1).await;
    mount_page(&mock_server, "/fine", 200, 1).await;

    let outcome = resolve_and_prime(
        create_test_config(3),
        Source::Urls(vec![
            format!("{}/broken", base_url),
            format!("{}/gone", base_url),
            format!("{}/fine", base_url),
        ]),
        Mode::Prime,
    )
    .await
    .expect("Priming failed");

    let RunOutcome::Primed(report) = outcome else {
        panic!("prime mode must prime");
    };
    assert!(!report.stopped_early);
    assert_eq!(report.summary.requested, 3);
    assert_eq!(report.summary.failed, 2);
}

async fn run_with_limit(throttle: usize, max_uncached: usize) -> (bool, Vec<String>) {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let mut pages = Vec::new();
    for i in 0..8 {
        let route = format!("/page{}", i);
        // Failed requests count toward the limit too
        let status = if i % 2 == 0 { 200 } else { 503 };
        Mock::given(method("GET"))
            .and(path(route.as_str()))
            .respond_with(ResponseTemplate::new(status))
            .mount(&mock_server)
            .await;
        pages.push((format!("{}{}", base_url, route), 1.0 - i as f64 / 10.0));
    }
    mount_sitemap(&mock_server, "/sitemap.xml", urlset(&pages)).await;

    let config = RunConfig {
        max_uncached,
        ..create_test_config(throttle)
    };

    let outcome = resolve_and_prime(
        config,
        Source::Sitemap(format!("{}/sitemap.xml", base_url)),
        Mode::Prime,
    )
    .await
    .expect("Priming failed");

    let RunOutcome::Primed(report) = outcome else {
        panic!("prime mode must prime");
    };
    (report.stopped_early, page_requests(&mock_server).await)
}

#[tokio::test]
async fn test_uncached_limit_stops_run() {
    let (stopped_early, requests) = run_with_limit(1, 3).await;

    assert!(stopped_early);
    assert_eq!(requests, vec!["/page0", "/page1", "/page2"]);
}

#[tokio::test]
async fn test_uncached_limit_holds_under_high_concurrency() {
    let (stopped_early, requests) = run_with_limit(8, 3).await;

    assert!(stopped_early);
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_limit_above_batch_size_never_fires() {
    let (stopped_early, requests) = run_with_limit(2, 20).await;

    assert!(!stopped_early);
    assert_eq!(requests.len(), 8);
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_audit_mode_reports_each_request() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let cache_dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(cache_dir.path().join("cached")).unwrap();
    std::fs::write(cache_dir.path().join("cached/index.html"), "<html></html>").unwrap();

    mount_page(&mock_server, "/cached/", 200, 0).await;
    mount_page(&mock_server, "/ok", 200, 1).await;
    mount_page(&mock_server, "/missing", 404, 1).await;

    let config = RunConfig {
        audit: true,
        local_cache: Some(LocalCacheConfig::new(cache_dir.path(), "index.html")),
        ..create_test_config(1)
    };
    let buffer = SharedBuffer::default();
    let primer = Primer::new(config)
        .unwrap()
        .with_audit_log(AuditLog::new(buffer.clone()));

    let source = Source::Urls(vec![
        format!("{}/cached/", base_url),
        format!("{}/ok", base_url),
        format!("{}/missing", base_url),
    ]);
    primer.run(&source, Mode::Prime).await.expect("Priming failed");

    let written = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    let lines: Vec<Vec<&str>> = written.lines().map(|l| l.split('\t').collect()).collect();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0][0], "200");
    assert_eq!(lines[0][2], format!("{}/ok", base_url));
    assert_eq!(lines[1][0], "404");
    assert_eq!(lines[1][2], format!("{}/missing", base_url));
    assert!(lines.iter().all(|cols| cols[1].parse::<u64>().is_ok()));
}
