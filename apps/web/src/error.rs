//! # エラーページ
//!
//! テンプレートの描画自体に失敗した場合やミドルウェアで処理を打ち切る場合に使う、
//! テンプレートに依存しない最小限のエラーレスポンス。

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

const INTERNAL_ERROR_PAGE: &str = r#"<!DOCTYPE html>
<html lang="de">
<head><meta charset="utf-8"><title>Fehler | Schwob aufm Sattl</title></head>
<body>
<h1>Da ist etwas schiefgelaufen</h1>
<p>Bitte versuche es später noch einmal.</p>
<p><a href="/">Zur Startseite</a></p>
</body>
</html>"#;

/// 500 エラーページ
pub fn internal_error_response() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Html(INTERNAL_ERROR_PAGE)).into_response()
}
