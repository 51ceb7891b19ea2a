//! Integration tests for the harvester
//!
//! These tests use wiremock to serve catalog fixtures and exercise the
//! full discover/scrape/enrich cycle end-to-end.

use appctl_harvest::config::{CatalogConfig, Config, HttpConfig, OutputConfig};
use appctl_harvest::scrape::{build_http_client, fetch_page, scrape_page};
use appctl_harvest::{run_harvest, DiscoveryError, HarvestError, NoopProgress, ProgressReporter};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at a mock server
///
/// Delays are zeroed so retry loops run at test speed.
fn create_test_config(base_url: &str, max_retries: u32, max_workers: usize) -> Config {
    Config {
        catalog: CatalogConfig {
            base_url: base_url.to_string(),
        },
        http: HttpConfig {
            user_agent: "TestAgent/1.0".to_string(),
            request_timeout: 5,
            retry_delay: 0.0,
            warmup_delay: 0.0,
            max_retries,
            max_workers,
        },
        output: OutputConfig {
            path: "./test_out.csv".to_string(),
            show_progress: false,
        },
    }
}

fn reporter() -> Arc<dyn ProgressReporter> {
    Arc::new(NoopProgress)
}

/// One catalog row in the source site's markup shape
fn row(app_id: u32, name: &str, description: &str, risk: usize, popularity: usize) -> String {
    let filled = |n: usize, icon: &str| {
        format!(r#"<img src="i.png" alt="black-background-{}-icon">"#, icon).repeat(n)
    };
    let unfilled = |n: usize, icon: &str| {
        format!(r#"<img src="i.png" alt="white-background-{}-icon">"#, icon).repeat(n)
    };

    format!(
        r#"<div class="row" onclick="location.href = '/appcontrol/{app_id}'">
            <div class="col-md-3" style="word-break: break-word"><b>{name}</b></div>
            <div class="col-md-3"><small>{description}</small></div>
            <div class="col-md-2">{}{}</div>
            <div class="col-md-2">{}{}</div>
        </div>"#,
        filled(risk, "star"),
        unfilled(5 - risk, "star"),
        filled(popularity, "circle"),
        unfilled(5 - popularity, "circle"),
    )
}

fn listing_page(total: u64, rows: &[String]) -> String {
    format!(
        r#"<html><body><p class="m-2">Total: <b>{}</b></p>{}</body></html>"#,
        total,
        rows.join("")
    )
}

fn detail_page(app_id: u32) -> String {
    format!(
        r#"<html><body>
        <div class="detail-item"><h3>Default Ports</h3><ul><li>80</li><li>443</li></ul></div>
        <div class="detail-item"><h3>Impact</h3><p>Impact for {app_id}.</p></div>
        <div class="detail-item"><h3>Technology</h3><p>Client-Server</p></div>
        </body></html>"#
    )
}

#[tokio::test]
async fn test_full_harvest_two_pages() {
    let mock_server = MockServer::start().await;
    let base_url = format!("{}/appcontrol", mock_server.uri());

    // Page 2 is mounted before page 1: its query matcher is a superset of
    // the bare path matcher and must be checked first.
    Mock::given(method("GET"))
        .and(path("/appcontrol"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(
            4,
            &[row(201, "Gamma (Update)", "third", 3, 1), row(202, "Delta", "fourth", 0, 5)],
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Page 1 is fetched twice: once for discovery, once in round 1.
    Mock::given(method("GET"))
        .and(path("/appcontrol"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(
            4,
            &[row(101, "Alpha", "first", 2, 4), row(102, "Beta", "second", 5, 0)],
        )))
        .expect(2)
        .mount(&mock_server)
        .await;

    for app_id in [101u32, 102, 201, 202] {
        Mock::given(method("GET"))
            .and(path(format!("/appcontrol/{}", app_id)))
            .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(app_id)))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let config = create_test_config(&base_url, 3, 4);
    let records = run_harvest(&config, reporter()).await.expect("harvest failed");

    assert_eq!(records.len(), 4);

    let mut ids: Vec<u32> = records.iter().map(|r| r.app_id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids, vec![101, 102, 201, 202]);

    let gamma = records.iter().find(|r| r.app_id == 201).unwrap();
    assert_eq!(gamma.name, "Gamma");
    assert_eq!(gamma.category, "Update");
    assert_eq!(gamma.description, "third");
    assert_eq!(gamma.risk, 3);
    assert_eq!(gamma.popularity, 1);
    assert_eq!(gamma.default_ports, "80, 443");
    assert_eq!(gamma.impact, "Impact for 201.");
    assert_eq!(gamma.technology, "Client-Server");

    let beta = records.iter().find(|r| r.app_id == 102).unwrap();
    assert_eq!(beta.category, "");
    assert_eq!(beta.risk, 5);
    assert_eq!(beta.popularity, 0);
}

#[tokio::test]
async fn test_zero_row_page_retried_then_yields_empty() {
    let mock_server = MockServer::start().await;
    let base_url = format!("{}/appcontrol", mock_server.uri());

    // A structurally valid page with no catalog rows at all.
    Mock::given(method("GET"))
        .and(path("/appcontrol"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(listing_page(100, &[])),
        )
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, 3, 1);
    let client = build_http_client(&config.http).unwrap();

    let records = scrape_page(&client, 1, 25, &config).await;
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_detail_failures_do_not_drop_records() {
    let mock_server = MockServer::start().await;
    let base_url = format!("{}/appcontrol", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/appcontrol"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(
            1,
            &[row(77, "Lonely", "only row", 1, 1)],
        )))
        .mount(&mock_server)
        .await;

    // Every detail fetch fails at the transport level.
    Mock::given(method("GET"))
        .and(path("/appcontrol/77"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, 2, 1);
    let records = run_harvest(&config, reporter()).await.expect("harvest failed");

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.app_id, 77);
    assert_eq!(record.name, "Lonely");
    assert_eq!(record.default_ports, "");
    assert_eq!(record.affected_products, "");
    assert_eq!(record.impact, "");
    assert_eq!(record.technology, "");
    assert_eq!(record.behavior, "");
    assert_eq!(record.references, "");
}

#[tokio::test]
async fn test_discovery_aborts_when_page_one_unreachable() {
    let mock_server = MockServer::start().await;
    let base_url = format!("{}/appcontrol", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/appcontrol"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, 2, 1);
    let result = run_harvest(&config, reporter()).await;

    assert!(matches!(
        result,
        Err(HarvestError::Discovery(
            DiscoveryError::InitialPageUnreachable
        ))
    ));
}

#[tokio::test]
async fn test_discovery_aborts_when_total_marker_missing() {
    let mock_server = MockServer::start().await;
    let base_url = format!("{}/appcontrol", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/appcontrol"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><body><p>nothing to see</p></body></html>".to_string(),
        ))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, 1, 1);
    let result = run_harvest(&config, reporter()).await;

    assert!(matches!(
        result,
        Err(HarvestError::Discovery(DiscoveryError::TotalCountMissing))
    ));
}

#[tokio::test]
async fn test_fetch_page_exhausts_retries_on_http_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 3, 1);
    let client = build_http_client(&config.http).unwrap();

    let url = format!("{}/flaky", mock_server.uri());
    let body = fetch_page(&client, &url, &config.http).await;
    assert!(body.is_none());
}

#[tokio::test]
async fn test_fetch_page_succeeds_mid_retry() {
    let mock_server = MockServer::start().await;

    // First two attempts fail, the third succeeds.
    Mock::given(method("GET"))
        .and(path("/recovering"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/recovering"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 5, 1);
    let client = build_http_client(&config.http).unwrap();

    let url = format!("{}/recovering", mock_server.uri());
    let body = fetch_page(&client, &url, &config.http).await;
    assert_eq!(body.unwrap(), "<html>ok</html>");
}

#[tokio::test]
async fn test_short_final_page_is_tolerated() {
    let mock_server = MockServer::start().await;
    let base_url = format!("{}/appcontrol", mock_server.uri());

    // Total of 3 with 2 per page: page 2 legitimately has a single row.
    Mock::given(method("GET"))
        .and(path("/appcontrol"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(
            3,
            &[row(300, "Tail", "last one", 2, 2)],
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/appcontrol"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(
            3,
            &[row(100, "One", "a", 1, 1), row(200, "Two", "b", 1, 1)],
        )))
        .mount(&mock_server)
        .await;

    for app_id in [100u32, 200, 300] {
        Mock::given(method("GET"))
            .and(path(format!("/appcontrol/{}", app_id)))
            .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(app_id)))
            .mount(&mock_server)
            .await;
    }

    let config = create_test_config(&base_url, 2, 2);
    let records = run_harvest(&config, reporter()).await.expect("harvest failed");

    assert_eq!(records.len(), 3);
    assert!(records.iter().any(|r| r.app_id == 300));
}
