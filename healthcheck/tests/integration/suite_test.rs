//! スイート全体の実HTTPテスト

use agentaflow_healthcheck::{CheckKind, HealthSuite, OutputFormat};

use crate::support::{MockDeployment, DASHBOARD_HTML, EXPOSITION, TARGETS_EMPTY};

/// 全サービス正常 → 全チェック成功
#[tokio::test]
async fn test_healthy_deployment_passes_all_checks() {
    let deployment = MockDeployment::healthy().await;
    let suite = HealthSuite::new(deployment.config()).unwrap();

    let report = suite.run(&[]).await;

    let names: Vec<&str> = report.verdicts.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Dashboard Health",
            "Dashboard Root",
            "Metrics Endpoint",
            "Prometheus Health",
            "Prometheus Ready",
            "Prometheus Metrics",
            "Dashboard Content",
            "Prometheus Targets",
            "WebSocket Route",
            "Concurrent Requests",
        ]
    );
    assert!(report.passed(), "{}", report.render_text());
    assert_eq!(report.exit_code(), 0);
}

/// 欠けている内容はそれぞれ独立して報告される
#[tokio::test]
async fn test_dashboard_content_reports_each_missing_section() {
    let deployment = MockDeployment::start().await;
    let html = DASHBOARD_HTML
        .replace("GPU Performance Metrics", "")
        .replace("Cost Analytics", "");
    deployment.mount_dashboard(&html, 400).await;

    let suite = HealthSuite::new(deployment.config()).unwrap();
    let report = suite.run(&[CheckKind::Dashboard]).await;

    assert_eq!(report.verdicts.len(), 1);
    let verdict = &report.verdicts[0];
    assert!(!verdict.passed);
    assert_eq!(verdict.failures.len(), 2);
    assert!(verdict.failures[0].contains("GPU Performance Metrics"));
    assert!(verdict.failures[1].contains("Cost Analytics"));
    assert_eq!(report.exit_code(), 1);
}

#[tokio::test]
async fn test_missing_metric_is_reported() {
    let deployment = MockDeployment::start().await;
    deployment
        .mount_exporter(&EXPOSITION.replace("gpu_power_usage_watts", "gpu_fan_speed"))
        .await;
    deployment.mount_prometheus(TARGETS_EMPTY).await;

    let suite = HealthSuite::new(deployment.config()).unwrap();
    let report = suite.run(&[CheckKind::Metrics]).await;

    let verdict = &report.verdicts[0];
    assert_eq!(verdict.name, "Prometheus Metrics");
    assert_eq!(verdict.failures.len(), 1);
    assert!(verdict.failures[0].contains("gpu_power_usage_watts"));
}

#[tokio::test]
async fn test_websocket_route_404_fails() {
    let deployment = MockDeployment::start().await;
    deployment.mount_dashboard(DASHBOARD_HTML, 404).await;

    let suite = HealthSuite::new(deployment.config()).unwrap();
    let report = suite.run(&[CheckKind::Websocket]).await;

    assert!(!report.passed());
    assert!(report.verdicts[0].failures[0].contains("404"));
}

#[tokio::test]
async fn test_unregistered_target_fails_with_last_response() {
    let deployment = MockDeployment::start().await;
    deployment.mount_prometheus(TARGETS_EMPTY).await;

    let suite = HealthSuite::new(deployment.config()).unwrap();
    let report = suite.run(&[CheckKind::Targets]).await;

    let verdict = &report.verdicts[0];
    assert!(!verdict.passed);
    assert!(verdict.failures[0].contains(TARGETS_EMPTY));
}

/// サービスが1つ落ちていても他のチェックは独立して判定される
#[tokio::test]
async fn test_down_exporter_does_not_affect_other_checks() {
    let deployment = MockDeployment::start().await;
    deployment.mount_dashboard(DASHBOARD_HTML, 400).await;
    deployment.mount_prometheus(TARGETS_EMPTY).await;

    let suite = HealthSuite::new(deployment.config()).unwrap();
    let report = suite.run(&[CheckKind::Health]).await;

    let failed: Vec<&str> = report
        .verdicts
        .iter()
        .filter(|v| !v.passed)
        .map(|v| v.name.as_str())
        .collect();
    assert_eq!(failed, vec!["Metrics Endpoint"]);
}

#[tokio::test]
async fn test_json_report_round_trips_verdicts() {
    let deployment = MockDeployment::healthy().await;
    let suite = HealthSuite::new(deployment.config()).unwrap();

    let report = suite.run(&[CheckKind::Health, CheckKind::Load]).await;
    let json = report.render(OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["verdicts"].as_array().unwrap().len(), 6);
    assert!(value["started_at"].is_string());
}
