//! # Web サーバー設定
//!
//! 環境変数からサーバーの設定を読み込む。
//! 値の解釈は純粋関数に分離し、環境変数に触れずにテストできるようにしている。

use std::env;

use thiserror::Error;

/// `API_BASE` 未設定時のコンテンツ API
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// `WEB_PORT` 未設定時のポート番号
pub const DEFAULT_PORT: u16 = 3000;

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
   #[error("WEB_PORT は有効なポート番号である必要があります: {0}")]
   InvalidPort(String),
}

/// Web サーバーの設定
#[derive(Debug, Clone)]
pub struct WebConfig {
   /// バインドアドレス
   pub host:           String,
   /// ポート番号
   pub port:           u16,
   /// コンテンツ API・認証 API のベース URL（末尾の `/` は除去済み）
   pub api_base:       String,
   /// Redis 接続 URL
   ///
   /// 未設定の場合はインメモリのトークンストアを使う。
   pub redis_url:      Option<String>,
   /// セッション Cookie に `Secure` 属性を付けるか（`ENV=production` のとき）
   pub secure_cookies: bool,
}

impl WebConfig {
   /// 環境変数から設定を読み込む
   pub fn from_env() -> Result<Self, ConfigError> {
      Ok(Self {
         host:           env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
         port:           parse_port(env::var("WEB_PORT").ok().as_deref())?,
         api_base:       normalize_api_base(env::var("API_BASE").ok().as_deref()),
         redis_url:      non_empty(env::var("REDIS_URL").ok()),
         secure_cookies: is_production(env::var("ENV").ok().as_deref()),
      })
   }

   /// 指定した API に向けた設定を作る（テスト・組み込み用）
   pub fn for_api(api_base: &str) -> Self {
      Self {
         host:           "127.0.0.1".to_string(),
         port:           DEFAULT_PORT,
         api_base:       normalize_api_base(Some(api_base)),
         redis_url:      None,
         secure_cookies: false,
      }
   }
}

fn parse_port(value: Option<&str>) -> Result<u16, ConfigError> {
   match value.map(str::trim).filter(|v| !v.is_empty()) {
      Some(v) => v.parse().map_err(|_| ConfigError::InvalidPort(v.to_string())),
      None => Ok(DEFAULT_PORT),
   }
}

fn normalize_api_base(value: Option<&str>) -> String {
   value
      .map(str::trim)
      .filter(|v| !v.is_empty())
      .unwrap_or(DEFAULT_API_BASE)
      .trim_end_matches('/')
      .to_string()
}

fn non_empty(value: Option<String>) -> Option<String> {
   value.filter(|v| !v.trim().is_empty())
}

fn is_production(value: Option<&str>) -> bool {
   value.is_some_and(|v| v.eq_ignore_ascii_case("production"))
}
