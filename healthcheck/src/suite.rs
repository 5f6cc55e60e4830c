//! ヘルスチェックスイート
//!
//! デプロイ済みのダッシュボード・メトリクスエクスポーター・Prometheusに対して
//! 名前付きチェックを実行する。各チェックは独立しており状態を共有しないため、
//! 選択されたチェックはすべて並行に実行される。
//!
//! 単発GETのチェック（内容・WebSocket・同時負荷）は、対象サービスの
//! レディネスをポーリングで確認してから実行する。

use crate::assertion::{
    assert_contains_all, assert_load_tolerated, assert_ready, assert_route_registered,
    assert_target_registered, Verdict,
};
use crate::config::HarnessConfig;
use crate::error::{HarnessResult, TransportError};
use crate::load::verify_under_load;
use crate::poller::{poll_endpoint, EndpointCheck};
use crate::probe::{HttpGet, ProbeResponse, ReqwestProbe};
use crate::report::SuiteReport;
use crate::targets::poll_for_target;
use chrono::Utc;
use clap::ValueEnum;
use futures::future::{join_all, BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::{sleep, timeout, Instant};
use tracing::{info, warn};

/// チェック種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    /// 各サービスのヘルス/レディネスエンドポイント
    Health,
    /// エクスポーターのメトリクス名
    Metrics,
    /// ダッシュボードHTMLの内容
    Dashboard,
    /// Prometheusのスクレイプターゲット登録
    Targets,
    /// WebSocketルートの存在
    Websocket,
    /// ダッシュボードへの同時リクエスト
    Load,
}

impl CheckKind {
    /// 全種別（実行順）
    pub const ALL: [CheckKind; 6] = [
        CheckKind::Health,
        CheckKind::Metrics,
        CheckKind::Dashboard,
        CheckKind::Targets,
        CheckKind::Websocket,
        CheckKind::Load,
    ];

    /// 表示用文字列
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::Health => "health",
            CheckKind::Metrics => "metrics",
            CheckKind::Dashboard => "dashboard",
            CheckKind::Targets => "targets",
            CheckKind::Websocket => "websocket",
            CheckKind::Load => "load",
        }
    }
}

/// 名前付きチェックの実行器
#[derive(Clone)]
pub struct HealthSuite {
    config: HarnessConfig,
    client: Arc<dyn HttpGet>,
}

impl HealthSuite {
    /// reqwestプローブでスイートを作成
    pub fn new(config: HarnessConfig) -> HarnessResult<Self> {
        config.validate()?;
        let client = ReqwestProbe::new(config.poll.attempt_timeout)?;
        Ok(Self {
            config,
            client: Arc::new(client),
        })
    }

    /// 任意のクライアントでスイートを作成
    pub fn with_client(config: HarnessConfig, client: Arc<dyn HttpGet>) -> HarnessResult<Self> {
        config.validate()?;
        Ok(Self { config, client })
    }

    /// 設定
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// 選択されたチェックを並行実行する（空なら全種別）
    pub async fn run(&self, selected: &[CheckKind]) -> SuiteReport {
        let started_at = Utc::now();
        let start = Instant::now();

        let kinds: Vec<CheckKind> = CheckKind::ALL
            .into_iter()
            .filter(|kind| selected.is_empty() || selected.contains(kind))
            .collect();

        info!(
            checks = ?kinds.iter().map(|k| k.as_str()).collect::<Vec<_>>(),
            "Running health checks"
        );

        let runs: Vec<BoxFuture<'_, Vec<Verdict>>> =
            kinds.iter().map(|kind| self.run_kind(*kind)).collect();
        let verdicts: Vec<Verdict> = join_all(runs).await.into_iter().flatten().collect();

        for verdict in verdicts.iter().filter(|v| !v.passed) {
            warn!(check = %verdict.name, url = %verdict.url, failures = ?verdict.failures, "Check failed");
        }

        SuiteReport::new(started_at, start.elapsed(), verdicts)
    }

    fn run_kind(&self, kind: CheckKind) -> BoxFuture<'_, Vec<Verdict>> {
        match kind {
            CheckKind::Health => self.check_health_endpoints().boxed(),
            CheckKind::Metrics => self.check_metrics_content().map(|v| vec![v]).boxed(),
            CheckKind::Dashboard => self.check_dashboard_content().map(|v| vec![v]).boxed(),
            CheckKind::Targets => self.check_targets().map(|v| vec![v]).boxed(),
            CheckKind::Websocket => self.check_websocket_route().map(|v| vec![v]).boxed(),
            CheckKind::Load => self.check_concurrent_load().map(|v| vec![v]).boxed(),
        }
    }

    /// 各サービスのヘルス/レディネスエンドポイントを200が返るまでポーリング
    pub async fn check_health_endpoints(&self) -> Vec<Verdict> {
        let cases = [
            ("Dashboard Health", self.config.dashboard("/health")),
            ("Dashboard Root", self.config.dashboard("/")),
            ("Metrics Endpoint", self.config.metrics_url.clone()),
            ("Prometheus Health", self.config.prometheus("/-/healthy")),
            ("Prometheus Ready", self.config.prometheus("/-/ready")),
        ];

        join_all(cases.into_iter().map(|(name, url)| async move {
            let check = EndpointCheck::ok(url);
            let outcome = poll_endpoint(self.client.as_ref(), &check, &self.config.poll).await;
            assert_ready(name, &check, &outcome, self.config.verbosity)
        }))
        .await
    }

    /// Prometheusのレディネス後、エクスポーターが期待メトリクスを公開しているか
    pub async fn check_metrics_content(&self) -> Verdict {
        const NAME: &str = "Prometheus Metrics";
        let start = Instant::now();

        if let Err(verdict) = self.await_ready(NAME, self.config.prometheus("/-/ready")).await {
            return verdict.with_elapsed(start.elapsed());
        }

        // 少なくとも1回スクレイプされるのを待つ
        sleep(self.config.scrape_grace).await;

        let url = &self.config.metrics_url;
        let response = self.get_once(url).await;
        assert_contains_all(
            NAME,
            url,
            &response,
            &self.config.expected_metrics,
            "metric",
        )
        .with_elapsed(start.elapsed())
    }

    /// ダッシュボードが期待するHTMLを返すか
    pub async fn check_dashboard_content(&self) -> Verdict {
        const NAME: &str = "Dashboard Content";
        let start = Instant::now();
        if let Err(verdict) = self.await_dashboard(NAME).await {
            return verdict.with_elapsed(start.elapsed());
        }

        let url = self.config.dashboard("/");
        let response = self.get_once(&url).await;
        assert_contains_all(
            NAME,
            &url,
            &response,
            &self.config.expected_dashboard_content,
            "content",
        )
        .with_elapsed(start.elapsed())
    }

    /// Prometheusがエクスポーターをスクレイプ対象として登録しているか
    pub async fn check_targets(&self) -> Verdict {
        let start = Instant::now();
        let url = self.config.prometheus("/api/v1/targets");
        let result = poll_for_target(
            self.client.as_ref(),
            &url,
            &self.config.target_signatures,
            &self.config.poll,
        )
        .await;
        assert_target_registered(
            "Prometheus Targets",
            &url,
            &result,
            &self.config.target_signatures,
            &self.config.poll,
            self.config.verbosity,
        )
        .with_elapsed(start.elapsed())
    }

    /// WebSocketルートが登録されているか（アップグレードは行わない）
    pub async fn check_websocket_route(&self) -> Verdict {
        const NAME: &str = "WebSocket Route";
        let start = Instant::now();
        if let Err(verdict) = self.await_dashboard(NAME).await {
            return verdict.with_elapsed(start.elapsed());
        }

        let url = self.config.dashboard("/ws");
        let response = self.get_once(&url).await;
        // 通常のGETではアップグレードに失敗するが、404でなければルートは存在する
        assert_route_registered(NAME, &url, &response, 404)
            .with_elapsed(start.elapsed())
    }

    /// ダッシュボードが同時リクエストを捌けるか
    pub async fn check_concurrent_load(&self) -> Verdict {
        const NAME: &str = "Concurrent Requests";
        let start = Instant::now();
        if let Err(verdict) = self.await_dashboard(NAME).await {
            return verdict.with_elapsed(start.elapsed());
        }

        let url = self.config.dashboard("/health");
        let result = verify_under_load(self.client.clone(), &url, 200, self.config.concurrency).await;
        assert_load_tolerated(
            NAME,
            &url,
            &result,
            self.config.tolerance_ratio,
        )
        .with_elapsed(start.elapsed())
    }

    async fn await_dashboard(&self, name: &str) -> Result<(), Verdict> {
        self.await_ready(name, self.config.dashboard("/health")).await
    }

    /// `url` が200を返すまで待つ。期限切れならそのチェックの失敗判定を返す
    async fn await_ready(&self, name: &str, url: String) -> Result<(), Verdict> {
        let ready = EndpointCheck::ok(url);
        let outcome = poll_endpoint(self.client.as_ref(), &ready, &self.config.poll).await;
        if outcome.succeeded() {
            Ok(())
        } else {
            Err(assert_ready(name, &ready, &outcome, self.config.verbosity))
        }
    }

    async fn get_once(&self, url: &str) -> Result<ProbeResponse, TransportError> {
        let attempt_timeout = self.config.poll.attempt_timeout;
        timeout(attempt_timeout, self.client.get(url))
            .await
            .unwrap_or(Err(TransportError::Timeout(attempt_timeout)))
    }
}
