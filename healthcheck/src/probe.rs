//! HTTPプローブ
//!
//! 監視対象サービスは「GET(url) → (status, body) または転送エラー」という
//! 能力インターフェースとしてのみ扱う。ポーラー・負荷検証はこのトレイト越しに
//! リクエストを発行するため、テストではスクリプト化したクライアントに差し替えられる。

use crate::error::{HarnessError, HarnessResult, TransportError};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;

/// User-Agent sent with every probe
pub const PROBE_USER_AGENT: &str = concat!("agentaflow-healthcheck/", env!("CARGO_PKG_VERSION"));

/// 完全に読み切ったレスポンス
///
/// ボディは常に最後まで読み込まれるため、接続はこの値が作られた時点で解放済み。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    /// HTTPステータスコード
    pub status: u16,
    /// レスポンスボディ
    pub body: Bytes,
}

impl ProbeResponse {
    /// 新しいレスポンスを作成
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// ボディをUTF-8として解釈（不正なバイト列は置換）
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// 単発GETの能力インターフェース
#[async_trait]
pub trait HttpGet: Send + Sync {
    /// `url` にGETを1回発行し、ボディまで読み切って返す
    async fn get(&self, url: &str) -> Result<ProbeResponse, TransportError>;
}

/// reqwestによる本番用プローブ
///
/// アイドル接続をプールしないため、リクエストごとに独立した接続を使う。
#[derive(Clone)]
pub struct ReqwestProbe {
    client: Client,
    timeout: Duration,
}

impl ReqwestProbe {
    /// クライアントレベルのタイムアウト付きでプローブを作成
    pub fn new(timeout: Duration) -> HarnessResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .user_agent(PROBE_USER_AGENT)
            .build()
            .map_err(|e| HarnessError::Client(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// クライアントレベルのタイムアウト
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else {
            TransportError::from(err)
        }
    }
}

#[async_trait]
impl HttpGet for ReqwestProbe {
    async fn get(&self, url: &str) -> Result<ProbeResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        // ステータス不一致でも診断用にボディを読み切り、接続を解放する
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(self.timeout)
            } else {
                TransportError::Body(e.to_string())
            }
        })?;

        Ok(ProbeResponse { status, body })
    }
}
