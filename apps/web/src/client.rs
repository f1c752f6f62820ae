//! # 外部 API クライアント
//!
//! 認証 API とコンテンツ API への HTTP 通信を担当する。
//!
//! ## モジュール構成
//!
//! - `auth_api`: トークン発行とプロフィール取得
//! - `content_api`: アドベンチャーの取得
//! - `error`: 共通エラー型
//! - `response`: レスポンスのステータス判定

pub mod auth_api;
pub mod content_api;
pub mod error;
mod response;

pub use auth_api::{AuthApiClient, AuthApiClientImpl, TokenResponse};
pub use content_api::{AdventureQuery, ContentApiClient, ContentApiClientImpl};
pub use error::ApiError;
