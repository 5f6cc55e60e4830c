//! 同時負荷検証
//!
//! 1つのエンドポイントに対して `concurrency` 件のGETを一斉に発行し、
//! 成功/失敗件数を集計する。各リクエストは独立したタスクで実行され、
//! 結果は有界チャネルに1件ずつ書き込まれる。呼び出し側はちょうど
//! `concurrency` 件を受信するまで待機する（集計全体にタイムアウトはない）。

use crate::probe::HttpGet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, Barrier};
use tracing::{debug, info};

/// 許容率比較の浮動小数点誤差吸収
const TOLERANCE_EPSILON: f64 = 1e-9;

/// バースト結果
///
/// `0 <= failure_count <= total_requests`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBurstResult {
    /// 発行したリクエスト数
    pub total_requests: u32,
    /// 失敗（転送エラーまたはステータス不一致）の件数
    pub failure_count: u32,
}

impl LoadBurstResult {
    /// 新しい結果を作成（失敗件数は総数で頭打ち）
    pub fn new(total_requests: u32, failure_count: u32) -> Self {
        Self {
            total_requests,
            failure_count: failure_count.min(total_requests),
        }
    }

    /// 成功件数
    pub fn success_count(&self) -> u32 {
        self.total_requests - self.failure_count
    }

    /// 失敗率 (0.0-1.0)
    pub fn failure_ratio(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            f64::from(self.failure_count) / f64::from(self.total_requests)
        }
    }

    /// 許容率を超えたか
    ///
    /// `failure_count > total_requests * ratio` のとき真。
    /// ちょうど閾値の件数は許容される。
    pub fn exceeds_tolerance(&self, ratio: f64) -> bool {
        let budget = f64::from(self.total_requests) * ratio;
        f64::from(self.failure_count) > budget + TOLERANCE_EPSILON
    }
}

/// 単一リクエストの結果
#[derive(Debug)]
enum Sample {
    Passed,
    Failed(String),
}

/// `concurrency` 件のGETを同時に発行して集計する
pub async fn verify_under_load(
    client: Arc<dyn HttpGet>,
    url: &str,
    expected_status: u16,
    concurrency: u32,
) -> LoadBurstResult {
    if concurrency == 0 {
        return LoadBurstResult::new(0, 0);
    }

    let (tx, mut rx) = mpsc::channel::<Sample>(concurrency as usize);
    // 全タスクが揃ってから一斉に発行する
    let barrier = Arc::new(Barrier::new(concurrency as usize));

    for _ in 0..concurrency {
        let client = client.clone();
        let tx = tx.clone();
        let barrier = barrier.clone();
        let url = url.to_string();
        tokio::spawn(async move {
            barrier.wait().await;
            let sample = match client.get(&url).await {
                Ok(response) if response.status == expected_status => Sample::Passed,
                Ok(response) => Sample::Failed(format!("got status {}", response.status)),
                Err(e) => Sample::Failed(e.to_string()),
            };
            let _ = tx.send(sample).await;
        });
    }
    drop(tx);

    let mut failure_count = 0u32;
    for _ in 0..concurrency {
        match rx.recv().await {
            Some(Sample::Passed) => {}
            Some(Sample::Failed(reason)) => {
                debug!(url = %url, reason = %reason, "Request failed");
                failure_count += 1;
            }
            None => {
                // 結果を送らずに終了したタスク（panic等）は失敗として数える
                debug!(url = %url, "Request task exited without reporting");
                failure_count += 1;
            }
        }
    }

    let result = LoadBurstResult::new(concurrency, failure_count);
    info!(
        url = %url,
        total = result.total_requests,
        failures = result.failure_count,
        "Load burst completed"
    );
    result
}
