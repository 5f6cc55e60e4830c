//! 実行結果レポート
//!
//! テキスト（PASS/FAIL一覧）とJSONの2形式で出力する。

use crate::assertion::{duration_ms, Verdict};
use crate::error::HarnessResult;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::time::Duration;

/// 出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 人間向けテキスト
    #[default]
    Text,
    /// JSON
    Json,
}

/// スイート全体の結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// 開始日時
    pub started_at: DateTime<Utc>,
    /// 所要時間
    #[serde(with = "duration_ms")]
    pub duration: Duration,
    /// 各チェックの判定
    pub verdicts: Vec<Verdict>,
}

impl SuiteReport {
    /// 新しいレポートを作成
    pub fn new(started_at: DateTime<Utc>, duration: Duration, verdicts: Vec<Verdict>) -> Self {
        Self {
            started_at,
            duration,
            verdicts,
        }
    }

    /// 全チェックが成功したか
    pub fn passed(&self) -> bool {
        self.verdicts.iter().all(|v| v.passed)
    }

    /// 失敗したチェック数
    pub fn failed_count(&self) -> usize {
        self.verdicts.iter().filter(|v| !v.passed).count()
    }

    /// プロセス終了コード（全成功で0、1件でも失敗なら1）
    pub fn exit_code(&self) -> i32 {
        if self.passed() {
            0
        } else {
            1
        }
    }

    /// 指定形式で描画
    pub fn render(&self, format: OutputFormat) -> HarnessResult<String> {
        match format {
            OutputFormat::Text => Ok(self.render_text()),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }

    /// テキスト形式で描画
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for verdict in &self.verdicts {
            let label = if verdict.passed { "PASS" } else { "FAIL" };
            let _ = writeln!(
                out,
                "{}\t{}\t{}\t{}ms",
                label,
                verdict.name,
                verdict.url,
                verdict.elapsed.as_millis()
            );
            for failure in &verdict.failures {
                let _ = writeln!(out, "    {}", failure);
            }
        }
        let _ = writeln!(
            out,
            "{} passed, {} failed ({} checks, {:.1}s)",
            self.verdicts.len() - self.failed_count(),
            self.failed_count(),
            self.verdicts.len(),
            self.duration.as_secs_f64()
        );
        out
    }
}
