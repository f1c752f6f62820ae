//! # サービス層
//!
//! ハンドラとクライアントの間に位置し、セッション管理と取得失敗時の縮退を担う。

pub mod adventure;
pub mod auth;

pub use adventure::{AdventureList, AdventureLookup, AdventureService};
pub use auth::{AuthService, AuthSession, DEFAULT_LOGIN_FAILURE, LoginError};
