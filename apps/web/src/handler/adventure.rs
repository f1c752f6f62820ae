//! # 公開ページハンドラ
//!
//! コンテンツ API の取得に失敗しても画面は描画し、空の一覧と案内文を表示する。

use std::sync::Arc;

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};

use super::{PageState, load_nav};
use crate::{
    service::AuthSession,
    view::{AdventureCard, adventure_context, page_context},
};

/// トップページ（公開済みの最新アドベンチャー）
#[tracing::instrument(skip_all)]
pub async fn home(
    State(state): State<Arc<PageState>>,
    Extension(session): Extension<AuthSession>,
) -> Response {
    let (nav, list) = tokio::join!(
        load_nav(&session),
        state.adventure_service.get_latest_published()
    );

    let cards: Vec<_> = list.adventures.iter().map(AdventureCard::public).collect();
    let mut context = page_context(&nav);
    context.insert("adventures", &cards);
    context.insert("load_failed", &list.error.is_some());

    state.views.render(StatusCode::OK, "index.html", &context)
}

/// アドベンチャー一覧
#[tracing::instrument(skip_all)]
pub async fn list_adventures(
    State(state): State<Arc<PageState>>,
    Extension(session): Extension<AuthSession>,
) -> Response {
    let (nav, list) = tokio::join!(
        load_nav(&session),
        state.adventure_service.get_all_adventures()
    );

    let cards: Vec<_> = list.adventures.iter().map(AdventureCard::public).collect();
    let mut context = page_context(&nav);
    context.insert("adventures", &cards);
    context.insert("load_failed", &list.error.is_some());

    state.views.render(StatusCode::OK, "adventures.html", &context)
}

/// アドベンチャー詳細（スラッグ指定）
///
/// API が 404 を返した場合は 404 ページ、それ以外の失敗は 502 ページを返す。
#[tracing::instrument(skip_all, fields(slug = %slug))]
pub async fn show_adventure(
    State(state): State<Arc<PageState>>,
    Extension(session): Extension<AuthSession>,
    Path(slug): Path<String>,
) -> Response {
    let (nav, lookup) = tokio::join!(
        load_nav(&session),
        state.adventure_service.get_adventure_by_slug(&slug)
    );

    match &lookup.adventure {
        Some(adventure) => state.views.render(
            StatusCode::OK,
            "adventure.html",
            &adventure_context(&nav, adventure, "/adventures"),
        ),
        None if lookup.is_not_found() => state.views.not_found(&nav),
        None => state.views.error(
            StatusCode::BAD_GATEWAY,
            &nav,
            "Das Abenteuer konnte gerade nicht geladen werden.",
        ),
    }
}

/// 該当ルートなし
pub async fn not_found(
    State(state): State<Arc<PageState>>,
    Extension(session): Extension<AuthSession>,
) -> Response {
    let nav = load_nav(&session).await;
    state.views.not_found(&nav)
}
