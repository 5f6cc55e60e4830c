//! ロギング初期化
//!
//! レポートは標準出力に書くため、トレースは標準エラーへ出力する。

use crate::error::{HarnessError, HarnessResult};
use tracing_subscriber::EnvFilter;

/// ログレベルを指定する環境変数
pub const LOG_LEVEL_ENV: &str = "AGENTAFLOW_HC_LOG_LEVEL";

/// `LOG_LEVEL_ENV` が未設定のときに参照する環境変数
pub const FALLBACK_LOG_LEVEL_ENV: &str = "RUST_LOG";

/// デフォルトのログレベル
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// `--verbose` 指定時のログレベル
pub const VERBOSE_LOG_LEVEL: &str = "debug";

/// 使用するフィルタ指定を決める
///
/// 優先順: `--verbose` > `AGENTAFLOW_HC_LOG_LEVEL` > `RUST_LOG` > `info`
pub fn log_directive(verbose: bool) -> String {
    if verbose {
        return VERBOSE_LOG_LEVEL.to_string();
    }
    std::env::var(LOG_LEVEL_ENV)
        .or_else(|_| std::env::var(FALLBACK_LOG_LEVEL_ENV))
        .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
}

/// グローバルなtracingサブスクライバーを初期化する
pub fn init(verbose: bool) -> HarnessResult<()> {
    let directive = log_directive(verbose);
    let filter = EnvFilter::try_new(&directive)
        .map_err(|e| HarnessError::Logging(format!("invalid log filter '{}': {}", directive, e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| HarnessError::Logging(e.to_string()))
}
