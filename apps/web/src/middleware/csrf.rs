//! # CSRF 検証ミドルウェア
//!
//! 状態変更リクエスト（POST/PUT/PATCH/DELETE）で CSRF トークンを検証する。
//!
//! トークンはログイン時にセッションごとに発行され、フォームの hidden フィールド
//! `csrf_token` か `X-CSRF-Token` ヘッダーで送られる。
//! ログインフォーム自体はセッションが無い状態で送信されるため検証しない。

use std::sync::Arc;

use axum::{
    Extension,
    body::{Body, Bytes},
    extract::State,
    http::{Method, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use sattl_domain::route_guard::LOGIN_PATH;

use crate::{
    error::internal_error_response,
    service::AuthSession,
    view::{Nav, Views},
};

/// CSRF 検証用のヘッダー名
const CSRF_HEADER: &str = "x-csrf-token";

/// CSRF トークンを運ぶフォームフィールド名
pub const CSRF_FORM_FIELD: &str = "csrf_token";

/// CSRF 検証をスキップするパス
const CSRF_SKIP_PATHS: &[&str] = &[LOGIN_PATH];

/// 検証のために読み込むフォーム本文の上限
const FORM_BODY_LIMIT: usize = 64 * 1024;

/// CSRF 検証が必要なメソッドかどうか
fn requires_csrf_validation(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// CSRF 検証をスキップするパスかどうか
fn should_skip_csrf(path: &str) -> bool {
    CSRF_SKIP_PATHS.contains(&path)
}

/// URL エンコードされたフォーム本文から 1 つのフィールドを取り出す
fn form_field(body: &[u8], name: &str) -> Option<String> {
    let body = std::str::from_utf8(body).ok()?;
    body.split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| {
            urlencoding::decode(&value.replace('+', " "))
                .ok()
                .map(|value| value.into_owned())
        })
}

fn csrf_error_response(views: &Views) -> Response {
    views.error(
        StatusCode::FORBIDDEN,
        &Nav::default(),
        "Die Anfrage konnte nicht bestätigt werden. Bitte lade die Seite neu.",
    )
}

/// CSRF 検証ミドルウェア
pub async fn csrf_guard(
    State(views): State<Arc<Views>>,
    Extension(session): Extension<AuthSession>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !requires_csrf_validation(request.method()) || should_skip_csrf(request.uri().path()) {
        return next.run(request).await;
    }

    // ヘッダーが無ければフォーム本文から読むため、本文を一度バッファする
    let (parts, body) = request.into_parts();
    let bytes: Bytes = match axum::body::to_bytes(body, FORM_BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "リクエスト本文を読み込めません");
            return csrf_error_response(&views);
        }
    };

    let provided = parts
        .headers
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| form_field(&bytes, CSRF_FORM_FIELD));

    let Some(provided) = provided else {
        tracing::warn!(path = %parts.uri.path(), "CSRF トークンがありません");
        return csrf_error_response(&views);
    };

    match session.verify_csrf_token(&provided).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!(path = %parts.uri.path(), "CSRF トークンが無効です");
            return csrf_error_response(&views);
        }
        Err(e) => {
            tracing::error!(
                error.category = "infrastructure",
                error.kind = "csrf_token",
                "CSRF トークン取得で内部エラー: {}",
                e
            );
            return internal_error_response();
        }
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
