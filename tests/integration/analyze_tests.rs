//! Integration tests for the analyzer
//!
//! These tests use wiremock to serve pages and link targets, and exercise
//! the full fetch → parse → extract → probe → aggregate pipeline.

use site_analyzer::analyzer::Analyzer;
use site_analyzer::config::Config;
use site_analyzer::html::{HtmlVersion, NOT_AVAILABLE};
use site_analyzer::AnalysisError;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with short timeouts
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.http.fetch_timeout_ms = 2_000;
    config.http.probe_timeout_ms = 1_000;
    config.http.connect_timeout_ms = 1_000;
    config.http.analysis_deadline_ms = 10_000;
    config
}

fn analyzer() -> Analyzer {
    Analyzer::new(create_test_config()).expect("Failed to create analyzer")
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"))
        .mount(server)
        .await;
}

async fn mount_head(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_end_to_end_example_page() {
    let site = MockServer::start().await;
    let other = MockServer::start().await;

    // Address the second server by hostname so its URL never contains the
    // first server's base URL
    let external = format!("http://localhost:{}/", other.address().port());

    mount_page(
        &site,
        "/",
        format!(
            r#"<!DOCTYPE html><html><head><title>T</title></head><body><h1>A</h1><h2>B</h2><form><input type="password"></form><a href="/x">x</a><a href="{}">y</a></body></html>"#,
            external
        ),
    )
    .await;
    mount_head(&site, "/x", 200).await;
    mount_head(&other, "/", 200).await;

    let result = analyzer()
        .analyze(&site.uri(), &CancellationToken::new())
        .await
        .expect("analysis failed");

    assert_eq!(result.title, "T");
    assert_eq!(result.html_version, HtmlVersion::Html5);
    assert_eq!(result.heading_counts.len(), 2);
    assert_eq!(result.heading_counts.get("h1"), Some(&1));
    assert_eq!(result.heading_counts.get("h2"), Some(&1));
    assert!(result.has_login_form);
    assert_eq!(result.internal_count, 1);
    assert_eq!(result.external_count, 1);
    assert_eq!(result.inaccessible_count, 0);
}

#[tokio::test]
async fn test_broken_and_unreachable_links_are_inaccessible() {
    let site = MockServer::start().await;
    let base = site.uri();

    mount_page(
        &site,
        "/",
        format!(
            r#"<html><body>
                <a href="/ok">ok</a>
                <a href="/missing">missing</a>
                <a href="/error">error</a>
                <a href="{base}/redirect">redirect</a>
                <a href="http://127.0.0.1:1/nothing-listens-here">refused</a>
                <a href="mailto:team@example.com">mail</a>
                <a href="relative/page.html">relative</a>
            </body></html>"#
        ),
    )
    .await;
    mount_head(&site, "/ok", 200).await;
    mount_head(&site, "/missing", 404).await;
    mount_head(&site, "/error", 503).await;
    Mock::given(method("HEAD"))
        .and(path("/redirect"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/ok", base).as_str()),
        )
        .mount(&site)
        .await;

    let result = analyzer()
        .analyze(&base, &CancellationToken::new())
        .await
        .expect("analysis failed");

    assert_eq!(result.total_links(), 7);
    assert_eq!(result.internal_count, 4);
    assert_eq!(result.external_count, 3);

    let accessible: Vec<bool> = result.links.iter().map(|l| l.is_accessible).collect();
    assert_eq!(
        accessible,
        vec![true, false, false, true, false, false, false]
    );
    assert_eq!(result.inaccessible_count, 5);
}

#[tokio::test]
async fn test_missing_title_and_doctype() {
    let site = MockServer::start().await;
    mount_page(&site, "/", "<html><body><p>bare</p></body></html>".to_string()).await;

    let result = analyzer()
        .analyze(&site.uri(), &CancellationToken::new())
        .await
        .expect("analysis failed");

    assert_eq!(result.title, NOT_AVAILABLE);
    assert_eq!(result.html_version, HtmlVersion::Unknown);
    assert!(result.heading_counts.is_empty());
    assert!(!result.has_login_form);
    assert_eq!(result.total_links(), 0);
}

#[tokio::test]
async fn test_duplicate_links_are_counted_individually() {
    let site = MockServer::start().await;
    mount_page(
        &site,
        "/",
        r#"<a href="/same">1</a><a href="/same">2</a><a href="/same">3</a>"#.to_string(),
    )
    .await;
    mount_head(&site, "/same", 200).await;

    let result = analyzer()
        .analyze(&site.uri(), &CancellationToken::new())
        .await
        .expect("analysis failed");

    assert_eq!(result.internal_count, 3);
    assert_eq!(result.inaccessible_count, 0);
}

#[tokio::test]
async fn test_fetch_404_fails() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&site)
        .await;

    let err = analyzer()
        .analyze(&format!("{}/missing", site.uri()), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AnalysisError::FetchFailed {
            status: Some(404),
            ..
        }
    ));
}

#[tokio::test]
async fn test_unparseable_body_fails() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0x3c, 0x68, 0xff, 0xfe, 0x80, 0x80])
                .insert_header("content-type", "text/html"),
        )
        .mount(&site)
        .await;

    let err = analyzer()
        .analyze(&site.uri(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AnalysisError::ParseFailed { .. }));
}

#[tokio::test]
async fn test_latin1_page_is_decoded_with_declared_charset() {
    let site = MockServer::start().await;
    let mut body = b"<!DOCTYPE html><html><head><title>Caf".to_vec();
    body.push(0xE9);
    body.extend_from_slice(b"</title></head><body><h2>Men");
    body.push(0xFA);
    body.extend_from_slice(b"</h2></body></html>");
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=iso-8859-1"))
        .mount(&site)
        .await;

    let result = analyzer()
        .analyze(&site.uri(), &CancellationToken::new())
        .await
        .expect("a Latin-1 page must parse");

    assert_eq!(result.title, "Caf\u{e9}");
    assert_eq!(result.html_version, HtmlVersion::Html5);
    assert_eq!(result.heading_counts.get("h2"), Some(&1));
}

#[tokio::test]
async fn test_unreachable_host_fails() {
    let err = analyzer()
        .analyze("http://127.0.0.1:1/", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AnalysisError::FetchFailed { status: None, .. }));
}

#[tokio::test]
async fn test_deadline_during_probing_still_returns_full_result() {
    let site = MockServer::start().await;
    mount_page(
        &site,
        "/",
        r#"<title>Slow links</title><a href="/slow-1">1</a><a href="/slow-2">2</a><a href="/slow-3">3</a>"#
            .to_string(),
    )
    .await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&site)
        .await;

    let mut config = create_test_config();
    config.http.probe_timeout_ms = 10_000;
    let analyzer = Analyzer::new(config).expect("Failed to create analyzer");

    let result = tokio::time::timeout(
        Duration::from_secs(4),
        analyzer.analyze_with_deadline(
            &site.uri(),
            &CancellationToken::new(),
            Duration::from_millis(500),
        ),
    )
    .await
    .expect("deadline did not stop the probes")
    .expect("a deadline during probing must not fail the analysis");

    assert_eq!(result.title, "Slow links");
    assert_eq!(result.total_links(), 3);
    assert_eq!(result.inaccessible_count, 3);
}

#[tokio::test]
async fn test_concurrent_analyses_are_independent() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    mount_page(&first, "/", "<title>First</title><h1>a</h1>".to_string()).await;
    mount_page(
        &second,
        "/",
        "<title>Second</title><h2>b</h2><h2>c</h2>".to_string(),
    )
    .await;

    let analyzer = analyzer();
    let cancel = CancellationToken::new();
    let first_url = first.uri();
    let second_url = second.uri();
    let (a, b) = tokio::join!(
        analyzer.analyze(&first_url, &cancel),
        analyzer.analyze(&second_url, &cancel)
    );
    let (a, b) = (a.expect("first failed"), b.expect("second failed"));

    assert_eq!(a.title, "First");
    assert_eq!(a.heading_counts.get("h1"), Some(&1));
    assert_eq!(b.title, "Second");
    assert_eq!(b.heading_counts.get("h2"), Some(&2));
    assert!(!b.heading_counts.contains_key("h1"));
}
