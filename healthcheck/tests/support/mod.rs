//! テスト用の模擬デプロイメント
//!
//! ダッシュボード・メトリクスエクスポーター・Prometheusをそれぞれ
//! wiremockサーバーで立てる。

#![allow(dead_code)]

use agentaflow_healthcheck::{HarnessConfig, PollSettings, Verbosity};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>AgentaFlow GPU Monitoring</title></head>
<body>
<section><h2>GPU Performance Metrics</h2></section>
<section><h2>Cost Analytics</h2></section>
</body>
</html>"#;

pub const EXPOSITION: &str = "\
# HELP gpu_temperature_celsius GPU temperature
# TYPE gpu_temperature_celsius gauge
gpu_temperature_celsius{gpu=\"0\"} 61
gpu_utilization_percent{gpu=\"0\"} 87.5
gpu_memory_used_bytes{gpu=\"0\"} 12884901888
gpu_power_usage_watts{gpu=\"0\"} 245
";

pub const TARGETS_REGISTERED: &str =
    r#"{"status":"success","data":{"activeTargets":[{"labels":{"job":"agentaflow","instance":"agentaflow:9001"},"health":"up"}]}}"#;

pub const TARGETS_EMPTY: &str = r#"{"status":"success","data":{"activeTargets":[]}}"#;

pub struct MockDeployment {
    pub dashboard: MockServer,
    pub exporter: MockServer,
    pub prometheus: MockServer,
}

impl MockDeployment {
    /// モックを何もマウントせずに起動
    pub async fn start() -> Self {
        Self {
            dashboard: MockServer::start().await,
            exporter: MockServer::start().await,
            prometheus: MockServer::start().await,
        }
    }

    /// 全サービスが正常な状態で起動
    pub async fn healthy() -> Self {
        let deployment = Self::start().await;
        deployment.mount_dashboard(DASHBOARD_HTML, 400).await;
        deployment.mount_exporter(EXPOSITION).await;
        deployment.mount_prometheus(TARGETS_REGISTERED).await;
        deployment
    }

    pub async fn mount_dashboard(&self, html: &str, ws_status: u16) {
        get_ok(&self.dashboard, "/health", "OK").await;
        get_ok(&self.dashboard, "/", html).await;
        Mock::given(method("GET"))
            .and(path("/ws"))
            .respond_with(ResponseTemplate::new(ws_status).set_body_string("Bad Request"))
            .mount(&self.dashboard)
            .await;
    }

    pub async fn mount_exporter(&self, exposition: &str) {
        get_ok(&self.exporter, "/metrics", exposition).await;
    }

    pub async fn mount_prometheus(&self, targets: &str) {
        get_ok(&self.prometheus, "/-/healthy", "Prometheus Server is Healthy.").await;
        get_ok(&self.prometheus, "/-/ready", "Prometheus Server is Ready.").await;
        get_ok(&self.prometheus, "/api/v1/targets", targets).await;
    }

    /// 短い期限の設定（実時間で動くテスト用）
    pub fn config(&self) -> HarnessConfig {
        HarnessConfig {
            dashboard_url: self.dashboard.uri(),
            metrics_url: format!("{}/metrics", self.exporter.uri()),
            prometheus_url: self.prometheus.uri(),
            poll: fast_poll(),
            concurrency: 20,
            scrape_grace: Duration::from_millis(10),
            verbosity: Verbosity::Full,
            ..HarnessConfig::default()
        }
    }
}

pub fn fast_poll() -> PollSettings {
    PollSettings {
        attempt_timeout: Duration::from_millis(300),
        retry_interval: Duration::from_millis(50),
        deadline: Duration::from_millis(800),
    }
}

pub async fn get_ok(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}
