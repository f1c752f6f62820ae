//! # レスポンス判定
//!
//! ステータスコードに応じて成功ボディのデシリアライズか [`ApiError`] への変換を行う。

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::ApiError;

/// レスポンスを判定し、成功時はボディをデシリアライズする
pub(super) async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!(status = status.as_u16(), body = %body, "API がエラーステータスを返しました");

    Err(ApiError::HttpStatus {
        code:   status.as_u16(),
        detail: extract_detail(&body),
    })
}

/// エラーボディから `detail` を取り出す
///
/// `detail` が文字列でない場合（バリデーションエラーの配列など）は `None`。
fn extract_detail(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("detail")?
        .as_str()
        .map(str::to_string)
}
