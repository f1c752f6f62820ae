//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! - `health`: ヘルスチェック
//! - `adventure`: 公開ページ（トップ、一覧、詳細）
//! - `admin`: 管理画面とログイン・ログアウト

pub mod admin;
pub mod adventure;
pub mod health;

use std::sync::Arc;

pub use admin::{
    DashboardQuery,
    LoginForm,
    dashboard,
    login,
    login_form,
    logout,
    show_adventure_by_id,
};
pub use adventure::{home, list_adventures, not_found, show_adventure};
pub use health::{ReadinessState, health_check, readiness_check};

use crate::{
    service::{AdventureService, AuthSession},
    view::{Nav, Views},
};

/// ページハンドラ共通の State
pub struct PageState {
    pub adventure_service: AdventureService,
    pub views:             Arc<Views>,
    pub secure_cookies:    bool,
}

/// ナビゲーション用に認証状態を読み込む
///
/// 読み取りに失敗した場合は未ログインとして表示する。
async fn load_nav(session: &AuthSession) -> Nav {
    match session.status().await {
        Ok(status) if status.is_authenticated() => Nav {
            csrf_token: session.csrf_token().await,
            ..Nav::from(&status)
        },
        Ok(status) => Nav::from(&status),
        Err(e) => {
            tracing::error!(
                error.category = "infrastructure",
                error.kind = "session",
                "セッションの読み取りに失敗しました: {}",
                e
            );
            Nav::default()
        }
    }
}
