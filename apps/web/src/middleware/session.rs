//! # セッションミドルウェア
//!
//! `session_id` Cookie からセッションを特定し、[`AuthSession`] をリクエストの
//! extensions に注入する。Cookie が無い（または不正な）場合は新しい ID を発行し、
//! レスポンスで Cookie を設定する。
//!
//! ハンドラは `Extension<AuthSession>` で受け取る。
//! ログインのようにハンドラ自身がセッション Cookie を設定した場合は、そちらを優先する。

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use uuid::Uuid;

use crate::service::AuthService;

/// Cookie 名
pub const SESSION_COOKIE_NAME: &str = "session_id";

/// Cookie の有効期限（秒）
///
/// トークンストアのスロット TTL と揃える。
const SESSION_MAX_AGE: i64 = 30 * 24 * 60 * 60;

/// セッションミドルウェアの State
#[derive(Clone)]
pub struct SessionState {
    pub auth_service:   AuthService,
    pub secure_cookies: bool,
}

/// セッションを特定して [`AuthSession`](crate::service::AuthSession) を注入する
pub async fn attach_session(
    State(state): State<SessionState>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let existing = jar
        .get(SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value())
        .filter(|value| is_valid_session_id(value))
        .map(str::to_string);

    let (session_id, issued) = match existing {
        Some(id) => (id, false),
        None => (Uuid::new_v4().to_string(), true),
    };

    request
        .extensions_mut()
        .insert(state.auth_service.session(&session_id));

    let response = next.run(request).await;

    if issued && !sets_session_cookie(&response) {
        tracing::debug!(%session_id, "セッションを発行しました");
        let jar = jar.add(build_session_cookie(&session_id, state.secure_cookies));
        (jar, response).into_response()
    } else {
        response
    }
}

/// セッション ID として受け付けるのは UUID 形式のみ
///
/// Redis キーに埋め込むため、任意の文字列は受け付けない。
fn is_valid_session_id(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}

/// レスポンスがすでにセッション Cookie を設定しているか
fn sets_session_cookie(response: &Response) -> bool {
    let prefix = format!("{SESSION_COOKIE_NAME}=");
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .any(|value| value.to_str().is_ok_and(|v| v.starts_with(&prefix)))
}

/// セッション Cookie を構築する
pub(crate) fn build_session_cookie(session_id: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, session_id.to_string()))
        .path("/")
        .max_age(time::Duration::seconds(SESSION_MAX_AGE))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}
