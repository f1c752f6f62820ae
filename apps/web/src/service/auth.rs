//! # 認証サービス
//!
//! トークンストアと認証 API を組み合わせて、ログイン・ログアウトと認証状態の照会を提供する。
//!
//! [`AuthService`] はアプリ全体で共有し、リクエストごとに [`AuthSession`] を切り出して使う。
//! セッションの状態は [`AuthSession`] の操作を通じてのみ変更される。
//!
//! ## ログインの流れ
//!
//! ログインは新しいセッション ID の上で行い、成功したら元のセッション ID のスロットを消す。
//! 呼び出し側は返された [`AuthSession`] の ID で Cookie を発行し直す。
//!
//! ```text
//! POST /api/v1/auth/token ──▶ token / csrf スロットに保存 ──▶ GET /api/v1/auth/me ──▶ user スロットに保存
//!          │ 失敗                      │ 失敗                            │ 失敗
//!          ▼                           ▼                                 ▼
//!   新旧セッションをクリア       新旧セッションをクリア        ログのみ（ログインは成功扱い）
//! ```

use std::sync::Arc;

use rand::Rng;
use sattl_domain::{session::AuthStatus, user::UserProfile};
use sattl_infra::{InfraError, TokenStore};
use subtle::ConstantTimeEq;
use thiserror::Error;
use uuid::Uuid;

use crate::client::{ApiError, AuthApiClient};

/// サーバーが理由を返さなかった場合のログイン失敗メッセージ
pub const DEFAULT_LOGIN_FAILURE: &str = "Login fehlgeschlagen";

/// ログイン失敗
#[derive(Debug, Error)]
pub enum LoginError {
    /// 認証 API が 2xx 以外を返した
    #[error("ログインが拒否されました（{status}）: {detail}")]
    Rejected { status: u16, detail: String },

    /// 認証 API に到達できない、またはレスポンスを解釈できない
    #[error("認証 API の呼び出しに失敗しました: {0}")]
    Api(ApiError),

    /// トークンの保存に失敗した
    #[error("セッションの保存に失敗しました: {0}")]
    Store(#[from] InfraError),
}

impl From<ApiError> for LoginError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::HttpStatus { code, detail } => LoginError::Rejected {
                status: code,
                detail: detail.unwrap_or_else(|| DEFAULT_LOGIN_FAILURE.to_string()),
            },
            other => LoginError::Api(other),
        }
    }
}

impl LoginError {
    /// 利用者に表示するメッセージ
    pub fn message(&self) -> &str {
        match self {
            LoginError::Rejected { detail, .. } => detail,
            LoginError::Api(_) | LoginError::Store(_) => DEFAULT_LOGIN_FAILURE,
        }
    }
}

/// 認証サービス
#[derive(Clone)]
pub struct AuthService {
    store:  Arc<dyn TokenStore>,
    client: Arc<dyn AuthApiClient>,
}

impl AuthService {
    pub fn new(store: Arc<dyn TokenStore>, client: Arc<dyn AuthApiClient>) -> Self {
        Self { store, client }
    }

    /// セッション ID に紐づく [`AuthSession`] を作る
    pub fn session(&self, session_id: impl Into<String>) -> AuthSession {
        AuthSession {
            session_id: session_id.into(),
            store:      self.store.clone(),
            client:     self.client.clone(),
        }
    }
}

/// 1 つのセッションに束縛された認証サービス
#[derive(Clone)]
pub struct AuthSession {
    session_id: String,
    store:      Arc<dyn TokenStore>,
    client:     Arc<dyn AuthApiClient>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession").finish_non_exhaustive()
    }
}

impl AuthSession {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// ユーザー名とパスワードでログインする
    ///
    /// 認証済みの状態は新しく発行したセッション ID に保存し、そのセッションを返す。
    /// ログイン前のセッション ID のスロットは成否にかかわらず削除する。
    /// どの段階で失敗しても新旧両方のスロットをクリアしてからエラーを返す。
    /// トークン取得後のプロフィール取得だけは失敗しても成功として扱う。
    #[tracing::instrument(skip_all, fields(session_id = %self.session_id))]
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession, LoginError> {
        let rotated = self.rotate();

        let result = rotated.exchange_credentials(username, password).await;
        self.clear_quietly().await;

        match result {
            Ok(()) => {
                tracing::info!(new_session_id = %rotated.session_id, "ログインしました");
                Ok(rotated)
            }
            Err(e) => {
                tracing::warn!(error = %e, "ログインに失敗しました");
                rotated.clear_quietly().await;
                Err(e)
            }
        }
    }

    /// 同じストアとクライアントを使う、新しいセッション ID のセッション
    fn rotate(&self) -> AuthSession {
        AuthSession {
            session_id: Uuid::new_v4().to_string(),
            store:      self.store.clone(),
            client:     self.client.clone(),
        }
    }

    async fn exchange_credentials(&self, username: &str, password: &str) -> Result<(), LoginError> {
        let token = self.client.request_token(username, password).await?;
        self.store
            .set_token(&self.session_id, &token.access_token)
            .await?;
        self.store
            .set_csrf_token(&self.session_id, &generate_csrf_token())
            .await?;

        if self.fetch_user_data().await.is_none() {
            tracing::warn!("トークンは発行されましたが、プロフィールを取得できませんでした");
        }
        Ok(())
    }

    /// プロフィールを取得し、保存済みのものと丸ごと置き換える
    ///
    /// トークンが無い場合は API を呼ばずに `None` を返す。
    /// 失敗はログに記録し、`None` として扱う。
    #[tracing::instrument(skip_all, fields(session_id = %self.session_id))]
    pub async fn fetch_user_data(&self) -> Option<UserProfile> {
        let token = self.get_token().await?;

        let user_data = match self.client.fetch_me(&token).await {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(error = %e, "プロフィールの取得に失敗しました");
                return None;
            }
        };

        if let Err(e) = self.store.set_user_data(&self.session_id, &user_data).await {
            tracing::error!(
                error.category = "infrastructure",
                error.kind = "session",
                "プロフィールの保存に失敗しました: {}",
                e
            );
            return None;
        }

        decode_profile(user_data)
    }

    /// トークンが存在するか
    pub async fn is_authenticated(&self) -> bool {
        self.get_token().await.is_some()
    }

    /// 認証済みかつ保存済みプロフィールが管理者か
    pub async fn is_admin(&self) -> bool {
        self.is_authenticated().await
            && self.get_user_data().await.is_some_and(|p| p.is_admin)
    }

    /// 保存済みのトークン
    pub async fn get_token(&self) -> Option<String> {
        match self.store.get_token(&self.session_id).await {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                log_read_failure(&e);
                None
            }
        }
    }

    /// 保存済みのプロフィール
    pub async fn get_user_data(&self) -> Option<UserProfile> {
        match self.store.get_user_data(&self.session_id).await {
            Ok(value) => value.and_then(decode_profile),
            Err(e) => {
                log_read_failure(&e);
                None
            }
        }
    }

    /// ログイン時に発行した CSRF トークン
    pub async fn csrf_token(&self) -> Option<String> {
        match self.store.get_csrf_token(&self.session_id).await {
            Ok(token) => token,
            Err(e) => {
                log_read_failure(&e);
                None
            }
        }
    }

    /// 送られてきた CSRF トークンが保存済みのものと一致するか
    ///
    /// 保存済みのトークンが無い場合は一致しない。比較は定数時間で行う。
    pub async fn verify_csrf_token(&self, provided: &str) -> Result<bool, InfraError> {
        let stored = self.store.get_csrf_token(&self.session_id).await?;
        Ok(stored.is_some_and(|stored| stored.as_bytes().ct_eq(provided.as_bytes()).into()))
    }

    /// 3 状態の認証状態
    ///
    /// ストアの読み取り失敗は呼び出し側に返す。
    pub async fn status(&self) -> Result<AuthStatus, InfraError> {
        self.store.status(&self.session_id).await
    }

    /// ログアウトする
    ///
    /// サーバー側のトークン失効は行わず、全スロットを削除するだけ。
    #[tracing::instrument(skip_all, fields(session_id = %self.session_id))]
    pub async fn logout(&self) -> Result<(), InfraError> {
        self.store.clear(&self.session_id).await?;
        tracing::info!("ログアウトしました");
        Ok(())
    }

    async fn clear_quietly(&self) {
        if let Err(e) = self.store.clear(&self.session_id).await {
            tracing::error!(
                error.category = "infrastructure",
                error.kind = "session",
                "セッションのクリアに失敗しました: {}",
                e
            );
        }
    }
}

/// 64 文字の16進文字列の CSRF トークンを生成する
fn generate_csrf_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn decode_profile(value: serde_json::Value) -> Option<UserProfile> {
    match serde_json::from_value(value) {
        Ok(profile) => Some(profile),
        Err(e) => {
            tracing::warn!(error = %e, "プロフィールを解釈できません");
            None
        }
    }
}

fn log_read_failure(e: &InfraError) {
    tracing::error!(
        error.category = "infrastructure",
        error.kind = "session",
        "セッションの読み取りに失敗しました: {}",
        e
    );
}
