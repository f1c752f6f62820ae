//! # トークンストア
//!
//! ブラウザごとのセッションに紐づくスロットを永続化する。
//!
//! - `auth_token`: 認証 API が発行したアクセストークン
//! - `user_data`: `GET /api/v1/auth/me` のレスポンス（JSON のまま保存）
//! - `csrf_token`: ログイン時に発行する CSRF トークン
//!
//! 読み取りは最後に書き込まれた値か `None` を返し、書き込みは上書きする。
//! サイズ制限は設けない。
//!
//! ## Redis キー設計
//!
//! | キー | 値 | TTL |
//! |-----|-----|-----|
//! | `session:{session_id}:auth_token` | トークン文字列 | 2592000秒（30日、書き込みごとに延長） |
//! | `session:{session_id}:user_data` | UserProfile (JSON) | 同上 |
//! | `session:{session_id}:csrf_token` | 64 文字の16進文字列 | 同上 |

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use sattl_domain::session::AuthStatus;
use serde_json::Value;

use crate::InfraError;

/// スロットの有効期限（秒）
/// 30日 = 2592000秒
pub const SLOT_TTL_SECONDS: u64 = 2_592_000;

/// トークンスロット名
pub const AUTH_TOKEN_SLOT: &str = "auth_token";

/// ユーザープロフィールスロット名
pub const USER_DATA_SLOT: &str = "user_data";

/// CSRF トークンスロット名
pub const CSRF_TOKEN_SLOT: &str = "csrf_token";

/// トークンストアトレイト
///
/// テスト時にインメモリ実装を使用できるようトレイトで定義。
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// トークンを取得する
    async fn get_token(&self, session_id: &str) -> Result<Option<String>, InfraError>;

    /// トークンを保存する（上書き）
    async fn set_token(&self, session_id: &str, token: &str) -> Result<(), InfraError>;

    /// ユーザープロフィールを取得する
    async fn get_user_data(&self, session_id: &str) -> Result<Option<Value>, InfraError>;

    /// ユーザープロフィールを保存する（丸ごと置き換え）
    async fn set_user_data(&self, session_id: &str, user_data: &Value) -> Result<(), InfraError>;

    /// CSRF トークンを取得する
    async fn get_csrf_token(&self, session_id: &str) -> Result<Option<String>, InfraError>;

    /// CSRF トークンを保存する（上書き）
    async fn set_csrf_token(&self, session_id: &str, token: &str) -> Result<(), InfraError>;

    /// 全スロットを削除する
    ///
    /// 存在しないスロットを削除しても成功とする。
    async fn clear(&self, session_id: &str) -> Result<(), InfraError>;

    /// 両スロットから認証状態を導出する
    async fn status(&self, session_id: &str) -> Result<AuthStatus, InfraError> {
        let token = self.get_token(session_id).await?;
        if token.is_none() {
            return Ok(AuthStatus::LoggedOut);
        }
        let user_data = self.get_user_data(session_id).await?;
        Ok(AuthStatus::from_slots(token.as_deref(), user_data.as_ref()))
    }
}

/// スロットのキーを生成する
pub(crate) fn slot_key(session_id: &str, slot: &str) -> String {
    format!("session:{}:{}", session_id, slot)
}

/// Redis を使用したトークンストア
pub struct RedisTokenStore {
    conn: ConnectionManager,
}

impl RedisTokenStore {
    /// 新しい RedisTokenStore を作成する
    ///
    /// # 引数
    ///
    /// - `redis_url`: Redis 接続 URL（例: `redis://localhost:6379`）
    pub async fn new(redis_url: &str) -> Result<Self, InfraError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        tracing::info!("Redis に接続しました");
        Ok(Self { conn })
    }

    /// 接続マネージャを取得する（Readiness Check 用）
    pub fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn get_token(&self, session_id: &str) -> Result<Option<String>, InfraError> {
        let mut conn = self.conn.clone();
        let token: Option<String> = conn.get(slot_key(session_id, AUTH_TOKEN_SLOT)).await?;
        Ok(token)
    }

    async fn set_token(&self, session_id: &str, token: &str) -> Result<(), InfraError> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(slot_key(session_id, AUTH_TOKEN_SLOT), token, SLOT_TTL_SECONDS)
            .await?;
        Ok(())
    }

    async fn get_user_data(&self, session_id: &str) -> Result<Option<Value>, InfraError> {
        let mut conn = self.conn.clone();
        let result: Option<String> = conn.get(slot_key(session_id, USER_DATA_SLOT)).await?;

        match result {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn set_user_data(&self, session_id: &str, user_data: &Value) -> Result<(), InfraError> {
        let json = serde_json::to_string(user_data)?;
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(slot_key(session_id, USER_DATA_SLOT), json, SLOT_TTL_SECONDS)
            .await?;
        Ok(())
    }

    async fn get_csrf_token(&self, session_id: &str) -> Result<Option<String>, InfraError> {
        let mut conn = self.conn.clone();
        let token: Option<String> = conn.get(slot_key(session_id, CSRF_TOKEN_SLOT)).await?;
        Ok(token)
    }

    async fn set_csrf_token(&self, session_id: &str, token: &str) -> Result<(), InfraError> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(slot_key(session_id, CSRF_TOKEN_SLOT), token, SLOT_TTL_SECONDS)
            .await?;
        Ok(())
    }

    async fn clear(&self, session_id: &str) -> Result<(), InfraError> {
        let keys = vec![
            slot_key(session_id, AUTH_TOKEN_SLOT),
            slot_key(session_id, USER_DATA_SLOT),
            slot_key(session_id, CSRF_TOKEN_SLOT),
        ];
        let mut conn = self.conn.clone();
        let _: () = conn.del(keys).await?;
        Ok(())
    }
}
