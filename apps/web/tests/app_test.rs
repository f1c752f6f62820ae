//! # ルーティングとルートガードの統合テスト
//!
//! `build_app` で組み立てたルーターにリクエストを送り、フェイク API と
//! インメモリトークンストアを使って画面遷移を検証する。

mod common;

use std::sync::Arc;

use axum::{Router, body::Body};
use http::{Method, Request, StatusCode, header};
use pretty_assertions::assert_eq;
use rstest::rstest;
use sattl_infra::{InMemoryTokenStore, TokenStore};
use sattl_web::{
    app_builder::build_app,
    config::WebConfig,
    handler::ReadinessState,
    middleware::CSRF_FORM_FIELD,
    view::Views,
};
use serde_json::json;
use tower::ServiceExt;

const SESSION_ID: &str = "0190a1b2-0000-4000-8000-000000000001";

const CSRF_TOKEN: &str = "c0ffee00c0ffee00c0ffee00c0ffee00c0ffee00c0ffee00c0ffee00c0ffee00";

struct TestApp {
    app:   Router,
    store: InMemoryTokenStore,
    api:   common::FakeApi,
}

async fn test_app() -> TestApp {
    let api = common::spawn_fake_api().await;
    let store = InMemoryTokenStore::new();
    let config = WebConfig::for_api(&api.base_url);
    let readiness_state = Arc::new(ReadinessState {
        redis_conn:  None,
        api_base:    config.api_base.clone(),
        http_client: reqwest::Client::new(),
    });
    let views = Arc::new(Views::new().unwrap());

    let app = build_app(&config, Arc::new(store.clone()), readiness_state, views);
    TestApp { app, store, api }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, format!("session_id={SESSION_ID}"))
        .body(Body::empty())
        .unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::COOKIE, format!("session_id={SESSION_ID}"))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// レスポンスが設定したセッション ID
fn issued_session_id(response: &axum::response::Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.strip_prefix("session_id="))
        .map(|v| v.split(';').next().unwrap_or_default().to_string())
        .next()
}

async fn sign_in(store: &InMemoryTokenStore, is_admin: bool) {
    store.set_token(SESSION_ID, "t1").await.unwrap();
    store.set_csrf_token(SESSION_ID, CSRF_TOKEN).await.unwrap();
    store
        .set_user_data(SESSION_ID, &json!({ "username": "ria", "is_admin": is_admin }))
        .await
        .unwrap();
}

// ===== ルートガード =====

#[rstest]
#[case("/admin")]
#[case("/admin/adventures/1")]
#[case("/administrator")]
#[tokio::test]
async fn test_未認証で管理画面に入るとログインページへ(#[case] path: &str) {
    let t = test_app().await;

    let response = t.app.oneshot(get(path)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/login");
}

#[tokio::test]
async fn test_一般ユーザーが管理画面に入るとトップへ() {
    let t = test_app().await;
    sign_in(&t.store, false).await;

    let response = t.app.oneshot(get("/admin")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_プロフィール未取得のセッションは管理者として扱わない() {
    let t = test_app().await;
    t.store.set_token(SESSION_ID, "t1").await.unwrap();

    let response = t.app.oneshot(get("/admin")).await.unwrap();

    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_管理者は管理画面を表示できる() {
    let t = test_app().await;
    sign_in(&t.store, true).await;

    let response = t.app.oneshot(get("/admin")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );
    let body = body_string(response).await;
    assert!(body.contains("Angemeldet als ria"));
    assert!(body.contains("Quer durch die Alpen"));
}

#[rstest]
#[case(true)]
#[case(false)]
#[tokio::test]
async fn test_認証済みでログインページに入ると管理画面へ(#[case] is_admin: bool) {
    let t = test_app().await;
    sign_in(&t.store, is_admin).await;

    let response = t.app.oneshot(get("/admin/login")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin");
}

#[rstest]
#[case("/")]
#[case("/adventures")]
#[case("/adventures/alpen")]
#[tokio::test]
async fn test_公開ページは未認証でも表示できる(#[case] path: &str) {
    let t = test_app().await;

    let response = t.app.oneshot(get(path)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// ===== ログイン・ログアウト =====

#[tokio::test]
async fn test_ログインフォームは未認証で表示できる() {
    let t = test_app().await;

    let response = t.app.oneshot(get("/admin/login")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("name=\"username\""));
}

#[tokio::test]
async fn test_ログイン成功で管理画面へリダイレクトする() {
    let t = test_app().await;

    let response = t
        .app
        .oneshot(post_form("/admin/login", "username=good&password=good"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin");
    let new_session_id = issued_session_id(&response).unwrap();
    assert_eq!(
        t.store.get_token(&new_session_id).await.unwrap().as_deref(),
        Some("t1")
    );
}

#[tokio::test]
async fn test_ログイン成功でセッションidを切り替え旧idを無効にする() {
    let t = test_app().await;

    let response = t
        .app
        .clone()
        .oneshot(post_form("/admin/login", "username=good&password=good"))
        .await
        .unwrap();

    let new_session_id = issued_session_id(&response).unwrap();
    assert_ne!(new_session_id, SESSION_ID);
    assert_eq!(t.store.get_token(SESSION_ID).await.unwrap(), None);
    assert_eq!(t.store.get_user_data(SESSION_ID).await.unwrap(), None);

    // ログイン前の Cookie では管理画面に入れない
    let response = t.app.clone().oneshot(get("/admin")).await.unwrap();
    assert_eq!(location(&response), "/admin/login");

    let request = Request::builder()
        .uri("/admin")
        .header(header::COOKIE, format!("session_id={new_session_id}"))
        .body(Body::empty())
        .unwrap();
    let response = t.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cookie無しでログインしてもセッションcookieは1つだけ() {
    let t = test_app().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/admin/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=good&password=good"))
        .unwrap();

    let response = t.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get_all(header::SET_COOKIE).iter().count(), 1);
    let new_session_id = issued_session_id(&response).unwrap();
    assert_eq!(
        t.store.get_token(&new_session_id).await.unwrap().as_deref(),
        Some("t1")
    );
}

#[tokio::test]
async fn test_ログイン失敗でフォームにエラーを表示する() {
    let t = test_app().await;

    let response = t
        .app
        .oneshot(post_form("/admin/login", "username=bad&password=bad"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_string(response).await;
    assert!(body.contains("Invalid credentials"));
    assert!(body.contains("value=\"bad\""));
    assert_eq!(t.store.get_token(SESSION_ID).await.unwrap(), None);
}

#[tokio::test]
async fn test_ログアウトでトップへ戻り管理画面に入れなくなる() {
    let t = test_app().await;
    sign_in(&t.store, true).await;

    let response = t
        .app
        .clone()
        .oneshot(post_form("/logout", &format!("{CSRF_FORM_FIELD}={CSRF_TOKEN}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let response = t.app.oneshot(get("/admin")).await.unwrap();
    assert_eq!(location(&response), "/admin/login");
}

#[rstest]
#[case("")]
#[case("csrf_token=forged")]
#[tokio::test]
async fn test_csrfトークンが無いか一致しないログアウトは403(#[case] body: &str) {
    let t = test_app().await;
    sign_in(&t.store, true).await;

    let response = t.app.oneshot(post_form("/logout", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        t.store.get_token(SESSION_ID).await.unwrap().as_deref(),
        Some("t1")
    );
}

#[tokio::test]
async fn test_csrfトークンはヘッダーでも受け付ける() {
    let t = test_app().await;
    sign_in(&t.store, true).await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/logout")
        .header(header::COOKIE, format!("session_id={SESSION_ID}"))
        .header("x-csrf-token", CSRF_TOKEN)
        .body(Body::empty())
        .unwrap();

    let response = t.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(t.store.get_token(SESSION_ID).await.unwrap(), None);
}

#[tokio::test]
async fn test_ログイン中のページにはログアウト用のcsrfトークンを埋め込む() {
    let t = test_app().await;
    sign_in(&t.store, true).await;

    let response = t.app.oneshot(get("/")).await.unwrap();

    let body = body_string(response).await;
    assert!(body.contains(&format!("name=\"csrf_token\" value=\"{CSRF_TOKEN}\"")));
}

// ===== 管理画面の絞り込み =====

#[tokio::test]
async fn test_ダッシュボードはステータスで絞り込める() {
    let t = test_app().await;
    sign_in(&t.store, true).await;

    let response = t.app.oneshot(get("/admin?status=draft")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let recorded = t.api.recorder.all();
    assert_eq!(recorded[0].query.as_deref(), Some("status=draft"));
}

#[tokio::test]
async fn test_ダッシュボードの不正なステータスは400() {
    let t = test_app().await;
    sign_in(&t.store, true).await;

    let response = t.app.oneshot(get("/admin?status=archived")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(t.api.recorder.all().is_empty());
}

// ===== 公開ページ =====

#[tokio::test]
async fn test_トップページは公開済みを6件まで要求する() {
    let t = test_app().await;

    let response = t.app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let recorded = t.api.recorder.all();
    assert_eq!(recorded[0].query.as_deref(), Some("status=published&limit=6"));
}

#[tokio::test]
async fn test_詳細ページはスラッグで表示する() {
    let t = test_app().await;

    let response = t.app.oneshot(get("/adventures/alpen")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Quer durch die Alpen"));
    assert!(body.contains("03.06.2024"));
}

#[tokio::test]
async fn test_存在しないスラッグは404ページ() {
    let t = test_app().await;

    let response = t.app.oneshot(get("/adventures/missing")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_string(response).await.contains("Nicht gefunden"));
}

#[tokio::test]
async fn test_未定義のパスは404ページ() {
    let t = test_app().await;

    let response = t.app.oneshot(get("/nowhere")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ===== セッション Cookie =====

#[tokio::test]
async fn test_cookieが無ければセッションを発行する() {
    let t = test_app().await;
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let response = t.app.oneshot(request).await.unwrap();

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("session_id="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
}

#[tokio::test]
async fn test_有効なcookieがあればセッションを発行しない() {
    let t = test_app().await;

    let response = t.app.oneshot(get("/")).await.unwrap();

    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_ヘルスチェックはセッションを発行しない() {
    let t = test_app().await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let response = t.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_readinessはapiに到達できればready() {
    let t = test_app().await;
    let request = Request::builder()
        .uri("/health/ready")
        .body(Body::empty())
        .unwrap();

    let response = t.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "ready");
}
