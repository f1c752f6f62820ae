//! # 認証 API クライアント
//!
//! ## エンドポイント
//!
//! - `POST /api/v1/auth/token` - ユーザー名とパスワードでアクセストークンを発行（フォーム形式）
//! - `GET /api/v1/auth/me` - トークンの持ち主のプロフィールを取得

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{ApiError, response::handle_response};
use crate::middleware::request_id::inject_request_id;

/// トークン発行レスポンス
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type:   Option<String>,
}

/// 認証 API クライアントトレイト
///
/// テスト時にスタブを使用できるようトレイトで定義。
#[async_trait]
pub trait AuthApiClient: Send + Sync {
    /// ユーザー名とパスワードでトークンを発行する
    async fn request_token(&self, username: &str, password: &str)
    -> Result<TokenResponse, ApiError>;

    /// トークンの持ち主のプロフィールを取得する
    ///
    /// レスポンスは解釈せずにそのまま返す。
    async fn fetch_me(&self, token: &str) -> Result<Value, ApiError>;
}

/// 認証 API クライアント実装
pub struct AuthApiClientImpl {
    base_url: String,
    client:   reqwest::Client,
}

impl AuthApiClientImpl {
    /// 新しい AuthApiClient を作成する
    ///
    /// # 引数
    ///
    /// - `base_url`: API のベース URL（例: `http://localhost:8000`）
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client:   reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl AuthApiClient for AuthApiClientImpl {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn request_token(
        &self,
        username: &str,
        password: &str,
    ) -> Result<TokenResponse, ApiError> {
        let url = format!("{}/api/v1/auth/token", self.base_url);

        let response = inject_request_id(self.client.post(&url))
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        handle_response(response).await
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn fetch_me(&self, token: &str) -> Result<Value, ApiError> {
        let url = format!("{}/api/v1/auth/me", self.base_url);

        let response = inject_request_id(self.client.get(&url))
            .bearer_auth(token)
            .send()
            .await?;

        handle_response(response).await
    }
}
