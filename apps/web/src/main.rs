//! # Web サーバー
//!
//! ## アーキテクチャ
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────────────┐
//! │   Browser    │────▶│     Web      │────▶│ Content / Auth API   │
//! │              │     │  port: 3000  │     │      port: 8000      │
//! └──────────────┘     └──────────────┘     └──────────────────────┘
//!                             │
//!                             ▼
//!                      ┌──────────────┐
//!                      │    Redis     │
//!                      │  (Session)   │
//!                      └──────────────┘
//! ```
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `WEB_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `WEB_PORT` | No | ポート番号（デフォルト: `3000`） |
//! | `API_BASE` | No | API のベース URL（デフォルト: `http://localhost:8000`） |
//! | `REDIS_URL` | 本番のみ | Redis 接続 URL（未設定時は開発用のインメモリ） |
//! | `ENV` | No | `production` でセッション Cookie に `Secure` を付与 |
//! | `LOG_FORMAT` | No | `json` / `pretty` |
//!
//! ## 起動方法
//!
//! ```bash
//! cargo run -p sattl-web
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use redis::aio::ConnectionManager;
use sattl_infra::{InMemoryTokenStore, RedisTokenStore, TokenStore};
use sattl_shared::observability::TracingConfig;
use sattl_web::{app_builder::build_app, config::WebConfig, handler::ReadinessState, view::Views};
use tokio::net::TcpListener;

/// Web サーバーのエントリーポイント
///
/// 以下の順序で初期化を行う:
///
/// 1. 環境変数の読み込み（.env ファイル）
/// 2. トレーシングの初期化
/// 3. アプリケーション設定の読み込み
/// 4. トークンストアとテンプレートの準備
/// 5. HTTP サーバーの起動
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    let tracing_config = TracingConfig::from_env("web");
    sattl_shared::observability::init_tracing(tracing_config);
    let _tracing_guard = tracing::info_span!("app", service = "web").entered();

    let config = WebConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!("Web サーバーを起動します: {}:{}", config.host, config.port);

    let (token_store, redis_conn): (Arc<dyn TokenStore>, Option<ConnectionManager>) =
        match &config.redis_url {
            Some(redis_url) => {
                let store = RedisTokenStore::new(redis_url)
                    .await
                    .context("Redis への接続に失敗しました")?;
                let conn = store.connection();
                (Arc::new(store), Some(conn))
            }
            None if config.secure_cookies => {
                anyhow::bail!("本番環境（ENV=production）では REDIS_URL が必須です");
            }
            None => {
                tracing::warn!(
                    "REDIS_URL が未設定のため、開発用のインメモリトークンストアを使用します（再起動でセッションは失われます）"
                );
                (Arc::new(InMemoryTokenStore::new()), None)
            }
        };

    let readiness_state = Arc::new(ReadinessState {
        redis_conn,
        api_base:    config.api_base.clone(),
        http_client: reqwest::Client::new(),
    });
    let views = Arc::new(Views::new().context("テンプレートの読み込みに失敗しました")?);

    let app = build_app(&config, token_store, readiness_state, views);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("バインドアドレスが不正です")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("{addr} にバインドできません"))?;

    tracing::info!("Web サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await.context("サーバーが異常終了しました")?;

    Ok(())
}
