//! # インメモリトークンストア
//!
//! 開発環境（`REDIS_URL` 未設定時）とテスト専用。本番では [`RedisTokenStore`](crate::RedisTokenStore) を使う。
//!
//! プロセスが終了するとセッションは失われる。
//! Redis と同じく、各スロットは書き込みから [`SLOT_TTL_SECONDS`] 秒で失効する。
//! 失効したスロットは読み取り時に無いものとして扱い、書き込みのたびに失効済みのセッションを掃除する。

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{InfraError, TokenStore, token_store::SLOT_TTL_SECONDS};

#[derive(Debug, Clone)]
struct Slot<T> {
    value:      T,
    expires_at: Instant,
}

impl<T: Clone> Slot<T> {
    fn live(slot: Option<&Self>, now: Instant) -> Option<T> {
        slot.filter(|s| s.expires_at > now).map(|s| s.value.clone())
    }
}

#[derive(Debug, Clone, Default)]
struct Slots {
    token:      Option<Slot<String>>,
    user_data:  Option<Slot<Value>>,
    csrf_token: Option<Slot<String>>,
}

impl Slots {
    fn is_expired(&self, now: Instant) -> bool {
        let live = |expires_at: Option<Instant>| expires_at.is_some_and(|at| at > now);
        !live(self.token.as_ref().map(|s| s.expires_at))
            && !live(self.user_data.as_ref().map(|s| s.expires_at))
            && !live(self.csrf_token.as_ref().map(|s| s.expires_at))
    }
}

/// インメモリのトークンストア
///
/// `Clone` は同じ記憶領域を共有する。
#[derive(Clone)]
pub struct InMemoryTokenStore {
    sessions: Arc<RwLock<HashMap<String, Slots>>>,
    ttl:      Duration,
}

impl Default for InMemoryTokenStore {
    fn default() -> Self {
        Self::with_ttl(Duration::from_secs(SLOT_TTL_SECONDS))
    }
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// スロットの有効期限を指定して作成する
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// 保持しているセッション数（失効済みで未掃除のものを含む）
    #[cfg(test)]
    async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn write<F>(&self, session_id: &str, update: F)
    where
        F: FnOnce(&mut Slots, Instant),
    {
        let now = Instant::now();
        let expires_at = now + self.ttl;
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, slots| !slots.is_expired(now));
        update(sessions.entry(session_id.to_string()).or_default(), expires_at);
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn get_token(&self, session_id: &str) -> Result<Option<String>, InfraError> {
        let sessions = self.sessions.read().await;
        let slot = sessions.get(session_id).and_then(|s| s.token.as_ref());
        Ok(Slot::live(slot, Instant::now()))
    }

    async fn set_token(&self, session_id: &str, token: &str) -> Result<(), InfraError> {
        let value = token.to_string();
        self.write(session_id, |slots, expires_at| {
            slots.token = Some(Slot { value, expires_at });
        })
        .await;
        Ok(())
    }

    async fn get_user_data(&self, session_id: &str) -> Result<Option<Value>, InfraError> {
        let sessions = self.sessions.read().await;
        let slot = sessions.get(session_id).and_then(|s| s.user_data.as_ref());
        Ok(Slot::live(slot, Instant::now()))
    }

    async fn set_user_data(&self, session_id: &str, user_data: &Value) -> Result<(), InfraError> {
        let value = user_data.clone();
        self.write(session_id, |slots, expires_at| {
            slots.user_data = Some(Slot { value, expires_at });
        })
        .await;
        Ok(())
    }

    async fn get_csrf_token(&self, session_id: &str) -> Result<Option<String>, InfraError> {
        let sessions = self.sessions.read().await;
        let slot = sessions.get(session_id).and_then(|s| s.csrf_token.as_ref());
        Ok(Slot::live(slot, Instant::now()))
    }

    async fn set_csrf_token(&self, session_id: &str, token: &str) -> Result<(), InfraError> {
        let value = token.to_string();
        self.write(session_id, |slots, expires_at| {
            slots.csrf_token = Some(Slot { value, expires_at });
        })
        .await;
        Ok(())
    }

    async fn clear(&self, session_id: &str) -> Result<(), InfraError> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }
}
