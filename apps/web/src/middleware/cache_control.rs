//! # キャッシュ制御ミドルウェア
//!
//! 管理画面はセッションごとに内容が変わるため、
//! `Cache-Control: no-store` を付けてブラウザや中間キャッシュに残さない。

use axum::{
    extract::Request,
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};

/// レスポンスに `Cache-Control: no-store` を付与する
pub async fn no_store(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
