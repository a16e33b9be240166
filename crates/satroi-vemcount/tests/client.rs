//! Integration tests for `VemcountClient` using wiremock HTTP mocks.

use chrono::NaiveDate;
use satroi_vemcount::{normalize_kpi_response, KpiQuery, Step, VemcountClient, VemcountError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FIXTURE: &str = include_str!("fixtures/kpi_report.json");

/// 5-second timeout, descriptive UA, no retries.
fn test_client(base_url: &str) -> VemcountClient {
    VemcountClient::new(&format!("{base_url}/report"), 5, "satroi-test/0.1", 0, 0)
        .expect("client construction should not fail")
}

fn test_client_with_retries(base_url: &str, max_retries: u32) -> VemcountClient {
    VemcountClient::new(
        &format!("{base_url}/report"),
        5,
        "satroi-test/0.1",
        max_retries,
        0,
    )
    .expect("client construction should not fail")
}

fn january_query() -> KpiQuery {
    KpiQuery {
        shop_ids: vec![26304, 26560, 26509],
        start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        step: Step::Day,
    }
}

fn fixture_json() -> serde_json::Value {
    serde_json::from_str(FIXTURE).expect("fixture should be valid JSON")
}

#[tokio::test]
async fn fetch_kpis_posts_report_body_and_returns_json() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/report"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(serde_json::json!({
            "data": [26304, 26560, 26509],
            "source": "shops",
            "period": "date",
            "start_date": "2024-01-01",
            "end_date": "2024-01-31",
            "step": "day"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let raw = client
        .fetch_kpis(&january_query())
        .await
        .expect("should fetch report");

    let table = normalize_kpi_response(&raw).expect("fixture should normalize");
    assert_eq!(table.len(), 6);
    assert_eq!(table.store_count(), 3);
}

#[tokio::test]
async fn fetch_kpis_surfaces_non_success_status_with_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/report"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.fetch_kpis(&january_query()).await.unwrap_err();

    match err {
        VemcountError::UnexpectedStatus { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid token");
        }
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_kpis_rejects_non_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/report"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.fetch_kpis(&january_query()).await.unwrap_err();
    assert!(matches!(err, VemcountError::Deserialize { .. }), "got {err:?}");
}

#[tokio::test]
async fn fetch_kpis_retries_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/report"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/report"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture_json()))
        .mount(&server)
        .await;

    let client = test_client_with_retries(&server.uri(), 2);
    let raw = client
        .fetch_kpis(&january_query())
        .await
        .expect("second attempt should succeed");
    assert!(raw.get("data").is_some());
}

#[tokio::test]
async fn fetch_kpis_validates_before_sending() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let mut query = january_query();
    query.shop_ids.clear();

    let err = client.fetch_kpis(&query).await.unwrap_err();
    assert!(matches!(err, VemcountError::InvalidQuery(_)));
}
