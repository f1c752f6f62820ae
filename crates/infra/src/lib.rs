//! # Sattl インフラ層
//!
//! ブラウザごとのセッション（トークンとユーザープロフィール）を永続化する
//! トークンストアを提供する。
//!
//! ## 責務
//!
//! - **トークンストア**: `auth_token` / `user_data` / `csrf_token` のスロットをセッション ID ごとに保持
//! - **キャッシュ接続**: Redis への接続管理
//!
//! ## モジュール構成
//!
//! - [`token_store`] - トークンストアのトレイトと Redis 実装
//! - [`memory`] - インメモリ実装（開発環境・テスト用）
//! - [`error`] - インフラ層エラー定義
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use sattl_infra::{RedisTokenStore, TokenStore};
//!
//! async fn setup() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = RedisTokenStore::new("redis://localhost:6379").await?;
//!     store.set_token("session-id", "access-token").await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod memory;
pub mod token_store;

pub use error::{InfraError, InfraErrorKind};
pub use memory::InMemoryTokenStore;
pub use token_store::{RedisTokenStore, TokenStore};
