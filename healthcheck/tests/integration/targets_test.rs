//! ターゲット登録ポーラーの実HTTPテスト

use agentaflow_healthcheck::{poll_for_target, ReqwestProbe};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::{fast_poll, get_ok, TARGETS_EMPTY};

fn signatures() -> Vec<String> {
    vec!["agentaflow".to_string(), "9001".to_string()]
}

#[tokio::test]
async fn test_target_found_on_first_attempt() {
    let mock = MockServer::start().await;
    get_ok(
        &mock,
        "/api/v1/targets",
        r#"{"activeTargets":[{"labels":{"job":"agentaflow"}}]}"#,
    )
    .await;

    let settings = fast_poll();
    let probe = ReqwestProbe::new(settings.attempt_timeout).unwrap();
    let url = format!("{}/api/v1/targets", mock.uri());

    let result = poll_for_target(&probe, &url, &signatures(), &settings).await;

    assert!(result.found);
    assert_eq!(result.attempts, 1);
    assert_eq!(mock.received_requests().await.unwrap().len(), 1);
}

/// 登録が遅れて反映されるケース
#[tokio::test]
async fn test_target_found_after_registration_lag() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/targets"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TARGETS_EMPTY))
        .up_to_n_times(2)
        .mount(&mock)
        .await;
    get_ok(
        &mock,
        "/api/v1/targets",
        r#"{"activeTargets":[{"scrapeUrl":"http://exporter:9001/metrics"}]}"#,
    )
    .await;

    let settings = fast_poll();
    let probe = ReqwestProbe::new(settings.attempt_timeout).unwrap();
    let url = format!("{}/api/v1/targets", mock.uri());

    let result = poll_for_target(&probe, &url, &signatures(), &settings).await;

    assert!(result.found);
    assert_eq!(result.attempts, 3);
}

#[tokio::test]
async fn test_target_not_found_reports_last_body() {
    let mock = MockServer::start().await;
    get_ok(&mock, "/api/v1/targets", TARGETS_EMPTY).await;

    let settings = fast_poll();
    let probe = ReqwestProbe::new(settings.attempt_timeout).unwrap();
    let url = format!("{}/api/v1/targets", mock.uri());

    let result = poll_for_target(&probe, &url, &signatures(), &settings).await;

    assert!(!result.found);
    assert!(result.attempts > 1);
    assert_eq!(result.last_response_body, TARGETS_EMPTY);
}

#[tokio::test]
async fn test_target_unreachable_records_error() {
    let settings = fast_poll();
    let probe = ReqwestProbe::new(settings.attempt_timeout).unwrap();

    let result = poll_for_target(
        &probe,
        "http://127.0.0.1:1/api/v1/targets",
        &signatures(),
        &settings,
    )
    .await;

    assert!(!result.found);
    assert!(result.last_response_body.starts_with("Error: "));
}
