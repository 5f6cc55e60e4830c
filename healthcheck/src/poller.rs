//! エンドポイントポーラー
//!
//! 期待ステータスが観測されるか全体期限が切れるまで、単発GETを
//! 一定間隔で再試行する。
//!
//! - 各試行は `attempt_timeout` で打ち切る（ハングした接続が期限全体を消費しない）
//! - 期限は各試行の**前**に確認する
//! - 転送エラーもステータス不一致も「まだ準備中」として同じように再試行する
//! - 期限切れは例外ではなく `PollOutcome` で返す

use crate::error::{PollError, TransportError};
use crate::probe::{HttpGet, ProbeResponse};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info};

/// デフォルトの試行タイムアウト（秒）
pub const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 5;

/// デフォルトの再試行間隔（秒）
pub const DEFAULT_RETRY_INTERVAL_SECS: u64 = 2;

/// デフォルトの全体期限（秒）
pub const DEFAULT_DEADLINE_SECS: u64 = 30;

/// Timing parameters for one poll call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSettings {
    /// Bound on a single GET
    pub attempt_timeout: Duration,
    /// Sleep between attempts
    pub retry_interval: Duration,
    /// Wall-clock budget measured from the start of the call
    pub deadline: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            attempt_timeout: Duration::from_secs(DEFAULT_ATTEMPT_TIMEOUT_SECS),
            retry_interval: Duration::from_secs(DEFAULT_RETRY_INTERVAL_SECS),
            deadline: Duration::from_secs(DEFAULT_DEADLINE_SECS),
        }
    }
}

/// ポーリング対象
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointCheck {
    /// 絶対URL
    pub url: String,
    /// 期待するHTTPステータス
    pub expected_status: u16,
}

impl EndpointCheck {
    /// 新しいチェックを作成
    pub fn new(url: impl Into<String>, expected_status: u16) -> Self {
        Self {
            url: url.into(),
            expected_status,
        }
    }

    /// 200を期待するチェック
    pub fn ok(url: impl Into<String>) -> Self {
        Self::new(url, 200)
    }
}

/// ポーリング結果
///
/// `succeeded` が真なら `last_status` は期待ステータスに一致し、`last_error` は空。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    succeeded: bool,
    last_status: Option<u16>,
    last_body: Option<Bytes>,
    last_error: Option<PollError>,
    attempts: u32,
    elapsed: Duration,
}

impl PollOutcome {
    /// 期待ステータスを観測した結果
    pub fn success(response: ProbeResponse, attempts: u32, elapsed: Duration) -> Self {
        Self {
            succeeded: true,
            last_status: Some(response.status),
            last_body: Some(response.body),
            last_error: None,
            attempts,
            elapsed,
        }
    }

    /// 期限切れの結果
    pub fn exhausted(
        error: PollError,
        last_status: Option<u16>,
        last_body: Option<Bytes>,
        attempts: u32,
        elapsed: Duration,
    ) -> Self {
        Self {
            succeeded: false,
            last_status,
            last_body,
            last_error: Some(error),
            attempts,
            elapsed,
        }
    }

    /// 成功したか
    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    /// 最後に観測したステータス
    pub fn last_status(&self) -> Option<u16> {
        self.last_status
    }

    /// 最後に観測したボディ
    pub fn last_body(&self) -> Option<&Bytes> {
        self.last_body.as_ref()
    }

    /// 失敗理由
    pub fn last_error(&self) -> Option<&PollError> {
        self.last_error.as_ref()
    }

    /// 発行したHTTP呼び出し回数
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// 呼び出し開始からの経過時間
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// 成功時の最終レスポンス
    pub fn into_response(self) -> Option<ProbeResponse> {
        match (self.succeeded, self.last_status, self.last_body) {
            (true, Some(status), Some(body)) => Some(ProbeResponse { status, body }),
            _ => None,
        }
    }
}

/// 期待ステータスが返るまでポーリングする
pub async fn poll_endpoint(
    client: &dyn HttpGet,
    check: &EndpointCheck,
    settings: &PollSettings,
) -> PollOutcome {
    let start = Instant::now();
    let mut attempts: u32 = 0;
    let mut last_status = None;
    let mut last_body = None;
    let mut last_observation = String::from("no attempt made");

    while start.elapsed() < settings.deadline {
        attempts += 1;
        let result = timeout(settings.attempt_timeout, client.get(&check.url)).await;
        let late = start.elapsed() >= settings.deadline;

        match result {
            Ok(Ok(response)) if response.status == check.expected_status && !late => {
                info!(
                    url = %check.url,
                    attempts,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Endpoint ready"
                );
                return PollOutcome::success(response, attempts, start.elapsed());
            }
            Ok(Ok(response)) => {
                debug!(
                    url = %check.url,
                    attempt = attempts,
                    status = response.status,
                    expected = check.expected_status,
                    late,
                    "Endpoint not ready"
                );
                last_observation = format!("HTTP {}", response.status);
                last_status = Some(response.status);
                last_body = Some(response.body);
            }
            Ok(Err(e)) => {
                debug!(url = %check.url, attempt = attempts, error = %e, "Endpoint unreachable");
                last_observation = e.to_string();
                last_status = None;
                last_body = None;
            }
            Err(_) => {
                let e = TransportError::Timeout(settings.attempt_timeout);
                debug!(url = %check.url, attempt = attempts, error = %e, "Endpoint attempt timed out");
                last_observation = e.to_string();
                last_status = None;
                last_body = None;
            }
        }

        let remaining = settings.deadline.saturating_sub(start.elapsed());
        if remaining.is_zero() {
            break;
        }
        sleep(settings.retry_interval.min(remaining)).await;
    }

    let error = PollError::DeadlineExceeded {
        url: check.url.clone(),
        timeout: settings.deadline,
        last: last_observation,
    };
    PollOutcome::exhausted(error, last_status, last_body, attempts, start.elapsed())
}
