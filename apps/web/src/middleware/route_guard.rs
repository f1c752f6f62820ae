//! # ルートガードミドルウェア
//!
//! ハンドラの実行前にリクエストごとに 1 回だけ
//! [`evaluate`](sattl_domain::route_guard::evaluate) を評価し、
//! リダイレクトの場合は `303 See Other` を返す。

use axum::{
    Extension,
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use sattl_domain::route_guard::{ADMIN_PREFIX, GuardDecision, evaluate};

use crate::{error::internal_error_response, service::AuthSession};

/// 管理画面配下へのアクセスを認証状態で振り分ける
pub async fn route_guard(
    Extension(session): Extension<AuthSession>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // 管理画面配下以外は認証状態に関係なく許可されるため、ストアを読まない
    if !request.uri().path().starts_with(ADMIN_PREFIX) {
        return next.run(request).await;
    }

    let status = match session.status().await {
        Ok(status) => status,
        Err(e) => {
            tracing::error!(
                error.category = "infrastructure",
                error.kind = "session",
                "セッションの読み取りに失敗しました: {}",
                e
            );
            return internal_error_response();
        }
    };

    match evaluate(request.uri().path(), &status) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::Redirect(to) => {
            tracing::debug!(path = %request.uri().path(), to, "ルートガードによりリダイレクトします");
            Redirect::to(to).into_response()
        }
    }
}
