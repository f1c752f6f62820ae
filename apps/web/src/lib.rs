//! # Schwob aufm Sattl Web
//!
//! 旅行・バイクパッキングブログのサーバーサイドレンダリングフロントエンド。
//! 記事はコンテンツ API から取得し、管理画面へのログインは認証 API に委譲する。
//!
//! ## モジュール構成
//!
//! - `app_builder`: DI とルーター構築
//! - `client`: 外部 API クライアント（認証 API、コンテンツ API）
//! - `config`: 環境変数からの設定読み込み
//! - `handler`: HTTP ハンドラ
//! - `middleware`: セッション、ルートガード、Request ID 伝播
//! - `service`: 認証サービス、アドベンチャーサービス
//! - `view`: テンプレート描画

pub mod app_builder;
pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod service;
pub mod view;
