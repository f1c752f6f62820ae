//! # アプリケーション構築
//!
//! DI（クライアント・サービス・State）の初期化とルーター構築を担当する。
//! `main.rs` はインフラ初期化とサーバー起動に集中する。

use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use sattl_infra::TokenStore;
use sattl_shared::observability::{MakeRequestUuidV7, make_request_span};
use tower_http::{
    compression::CompressionLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    client::{AuthApiClient, AuthApiClientImpl, ContentApiClient, ContentApiClientImpl},
    config::WebConfig,
    handler::{
        PageState,
        ReadinessState,
        dashboard,
        health_check,
        home,
        list_adventures,
        login,
        login_form,
        logout,
        not_found,
        readiness_check,
        show_adventure,
        show_adventure_by_id,
    },
    middleware::{
        SessionState,
        attach_session,
        csrf_guard,
        no_store,
        request_id::store_request_id,
        route_guard,
    },
    service::{AdventureService, AuthService},
    view::Views,
};

/// DI コンテナの構築とルーター定義を行う
///
/// インフラ初期化済みの依存を受け取り、クライアント → サービス → State → Router の
/// 順に組み立てる。
pub fn build_app(
    config: &WebConfig,
    token_store: Arc<dyn TokenStore>,
    readiness_state: Arc<ReadinessState>,
    views: Arc<Views>,
) -> Router {
    // クライアントの初期化
    let auth_api_client: Arc<dyn AuthApiClient> =
        Arc::new(AuthApiClientImpl::new(&config.api_base));
    let content_api_client: Arc<dyn ContentApiClient> =
        Arc::new(ContentApiClientImpl::new(&config.api_base));

    // サービスと State
    let session_state = SessionState {
        auth_service:   AuthService::new(token_store, auth_api_client),
        secure_cookies: config.secure_cookies,
    };
    let page_state = Arc::new(PageState {
        adventure_service: AdventureService::new(content_api_client),
        views:             views.clone(),
        secure_cookies:    config.secure_cookies,
    });

    // 管理画面はセッションごとに内容が変わるためキャッシュさせない
    let admin = Router::new()
        .route("/admin", get(dashboard))
        .route("/admin/adventures/{id}", get(show_adventure_by_id))
        .route("/admin/login", get(login_form).post(login))
        .layer(from_fn(no_store));

    // ページ: セッション → ルートガード → CSRF 検証 → ハンドラ
    let pages = Router::new()
        .route("/", get(home))
        .route("/adventures", get(list_adventures))
        .route("/adventures/{slug}", get(show_adventure))
        .route("/logout", post(logout))
        .merge(admin)
        .fallback(not_found)
        .with_state(page_state)
        .layer(from_fn_with_state(views, csrf_guard))
        .layer(from_fn(route_guard))
        .layer(from_fn_with_state(session_state, attach_session));

    // ヘルスチェックはセッションを発行しない
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .with_state(readiness_state)
        .merge(pages)
        .layer(CompressionLayer::new())
        .layer(from_fn(store_request_id))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
