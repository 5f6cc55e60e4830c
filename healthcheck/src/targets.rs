//! スクレイプターゲット登録ポーラー
//!
//! 監視システムのターゲット一覧APIを取得し、特定サービスがスクレイプ対象として
//! 登録されているかをボディの部分文字列で判定する。
//! ターゲット登録は結果整合的（監視システム側が独自の周期で反映する）なので、
//! 単発チェックではなく見えるまでポーリングする。
//!
//! 判定は大文字小文字を区別するバイト列の部分一致のみで、JSONは解析しない。

use crate::error::TransportError;
use crate::poller::PollSettings;
use crate::probe::HttpGet;
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info};

/// ターゲット検索結果
///
/// `found` が真なのは、HTTP 200 で取得したボディにシグネチャが含まれていた場合のみ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetQueryResult {
    /// 登録が確認できたか
    pub found: bool,
    /// 最後に取得したボディ（転送エラー時はエラーテキスト）
    pub last_response_body: String,
    /// 取得を試みた回数
    pub attempts: u32,
}

/// ボディがいずれかのシグネチャを含むか
pub fn matches_any_signature(body: &str, signatures: &[String]) -> bool {
    signatures
        .iter()
        .any(|sig| !sig.is_empty() && body.contains(sig.as_str()))
}

/// ターゲットが見えるまで `discovery_url` をポーリングする
pub async fn poll_for_target(
    client: &dyn HttpGet,
    discovery_url: &str,
    signatures: &[String],
    settings: &PollSettings,
) -> TargetQueryResult {
    let start = Instant::now();
    let mut attempts: u32 = 0;
    let mut last_body = String::new();

    while start.elapsed() < settings.deadline {
        attempts += 1;

        match timeout(settings.attempt_timeout, client.get(discovery_url)).await {
            Ok(Ok(response)) => {
                last_body = response.text();
                if response.status == 200 && matches_any_signature(&last_body, signatures) {
                    info!(
                        url = %discovery_url,
                        attempts,
                        "Scrape target registered"
                    );
                    return TargetQueryResult {
                        found: true,
                        last_response_body: last_body,
                        attempts,
                    };
                }
                debug!(
                    url = %discovery_url,
                    attempt = attempts,
                    status = response.status,
                    "Scrape target not registered yet"
                );
            }
            Ok(Err(TransportError::Body(e))) => {
                last_body = format!("Error reading body: {}", e);
                debug!(url = %discovery_url, attempt = attempts, error = %e, "Target list unreadable");
            }
            Ok(Err(e)) => {
                last_body = format!("Error: {}", e);
                debug!(url = %discovery_url, attempt = attempts, error = %e, "Target list unreachable");
            }
            Err(_) => {
                let e = TransportError::Timeout(settings.attempt_timeout);
                last_body = format!("Error: {}", e);
                debug!(url = %discovery_url, attempt = attempts, error = %e, "Target list timed out");
            }
        }

        let remaining = settings.deadline.saturating_sub(start.elapsed());
        if remaining.is_zero() {
            break;
        }
        sleep(settings.retry_interval.min(remaining)).await;
    }

    TargetQueryResult {
        found: false,
        last_response_body: last_body,
        attempts,
    }
}
