//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! ハーネスが実行を中断するのは設定エラー（不正なURLなど）のみ。
//! 到達不能・ステータス不一致・期限切れはすべて結果値として返され、
//! ここで定義する `HarnessError` にはならない。

use std::time::Duration;
use thiserror::Error;

/// Transport-level failure of a single GET
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Connection refused/reset, DNS failure, TLS failure, etc.
    #[error("request failed: {0}")]
    Request(String),

    /// The attempt did not complete within its own timeout
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Status line arrived but the body could not be read
    #[error("failed to read body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_body() || err.is_decode() {
            Self::Body(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// Failure reported by the endpoint poller
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PollError {
    /// The overall deadline elapsed before the expected status was observed
    #[error("endpoint {url} not ready after {timeout:?} (last: {last})")]
    DeadlineExceeded {
        /// Polled URL
        url: String,
        /// Overall deadline that was exhausted
        timeout: Duration,
        /// Last observed status or transport error
        last: String,
    },
}

/// Fatal harness error
///
/// Only configuration problems end up here; runtime conditions are folded
/// into verdicts.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A configured URL could not be parsed
    #[error("Invalid URL for {name}: {url} ({reason})")]
    InvalidUrl {
        /// Which setting held the URL
        name: &'static str,
        /// The offending value
        url: String,
        /// Parser message
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(String),

    /// Logging could not be initialised
    #[error("Logging error: {0}")]
    Logging(String),

    /// Report serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias for fallible harness setup
pub type HarnessResult<T> = Result<T, HarnessError>;
