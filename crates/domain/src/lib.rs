//! # Sattl ドメイン層
//!
//! ブログフロントエンドが扱うデータモデルと、副作用を持たない判定ロジックを定義する。
//!
//! ## 依存関係の方向
//!
//! ```text
//! web → infra → domain
//!   ↘          ↗
//!     domain
//! ```
//!
//! ドメイン層は HTTP やストレージに一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`adventure`] - アドベンチャー（ブログ記事）と一覧ページ
//! - [`user`] - 認証 API が返すユーザープロフィール
//! - [`session`] - セッションの三状態ビュー（[`session::AuthStatus`]）
//! - [`route_guard`] - ナビゲーション前の許可/リダイレクト判定
//! - [`error`] - ドメイン層エラー

pub mod adventure;
pub mod error;
pub mod route_guard;
pub mod session;
pub mod user;

pub use error::DomainError;
