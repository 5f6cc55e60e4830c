//! AgentaFlow health-check harness
//!
//! デプロイ後に外部から実行し、ダッシュボード・メトリクスエクスポーター・
//! Prometheusが到達可能で、期待する内容を返し、スクレイプ対象として登録され、
//! 同時負荷に耐えられることを確認する。

#![warn(missing_docs)]

/// 判定レイヤー（結果 → 名前付き判定）
pub mod assertion;

/// CLIインターフェース
pub mod cli;

/// 設定管理
pub mod config;

/// エラー型
pub mod error;

/// 同時負荷検証
pub mod load;

/// ロギング初期化ユーティリティ
pub mod logging;

/// エンドポイントポーラー
pub mod poller;

/// HTTPプローブ（GET能力インターフェース）
pub mod probe;

/// 実行結果レポート
pub mod report;

/// ヘルスチェックスイート
pub mod suite;

/// スクレイプターゲット登録ポーラー
pub mod targets;

pub use assertion::{Verbosity, Verdict};
pub use config::HarnessConfig;
pub use error::{HarnessError, PollError, TransportError};
pub use load::{verify_under_load, LoadBurstResult};
pub use poller::{poll_endpoint, EndpointCheck, PollOutcome, PollSettings};
pub use probe::{HttpGet, ProbeResponse, ReqwestProbe};
pub use report::{OutputFormat, SuiteReport};
pub use suite::{CheckKind, HealthSuite};
pub use targets::{poll_for_target, TargetQueryResult};
