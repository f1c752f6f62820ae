//! # ヘルスチェックハンドラ
//!
//! - `/health` — Liveness Check（常に `"healthy"` を返す）
//! - `/health/ready` — Readiness Check（トークンストアとコンテンツ API の到達性を確認）
//!
//! レスポンス型は [`sattl_shared::HealthResponse`] / [`sattl_shared::ReadinessResponse`] を参照。

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use redis::aio::ConnectionManager;
use sattl_shared::{CheckStatus, HealthResponse, ReadinessResponse};

/// 個別チェックのタイムアウト
const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// ヘルスチェックエンドポイント
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status:  "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness Check 用の State
pub struct ReadinessState {
    /// Redis 接続（インメモリストア使用時は `None`）
    pub redis_conn:  Option<ConnectionManager>,
    pub api_base:    String,
    pub http_client: reqwest::Client,
}

/// Readiness Check エンドポイント
///
/// トークンストアとコンテンツ API を並行チェックする。
/// 全チェック OK → 200、1 つでも失敗 → 503。
#[tracing::instrument(skip_all)]
pub async fn readiness_check(State(state): State<Arc<ReadinessState>>) -> impl IntoResponse {
    let (store_result, api_result) = tokio::join!(
        check_token_store(state.redis_conn.clone()),
        check_content_api(&state.http_client, &state.api_base),
    );

    let mut checks = HashMap::new();
    checks.insert("token_store".to_string(), store_result);
    checks.insert("content_api".to_string(), api_result);

    let response = ReadinessResponse::from_checks(checks);
    let http_status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (http_status, Json(response))
}

/// Redis への接続を PING で確認する
///
/// インメモリストアは常に利用可能とみなす。
async fn check_token_store(conn: Option<ConnectionManager>) -> CheckStatus {
    let Some(mut conn) = conn else {
        return CheckStatus::Ok;
    };

    match tokio::time::timeout(
        CHECK_TIMEOUT,
        redis::cmd("PING").query_async::<String>(&mut conn),
    )
    .await
    {
        Ok(Ok(_)) => CheckStatus::Ok,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "readiness check: redis ping failed");
            CheckStatus::Error
        }
        Err(_) => {
            tracing::warn!("readiness check: redis check timed out");
            CheckStatus::Error
        }
    }
}

/// コンテンツ API の一覧エンドポイントに 1 件だけ問い合わせる
async fn check_content_api(client: &reqwest::Client, api_base: &str) -> CheckStatus {
    let url = format!("{api_base}/api/adventures/");
    let request = client.get(&url).query(&[("limit", "1")]).send();

    match tokio::time::timeout(CHECK_TIMEOUT, request).await {
        Ok(Ok(response)) if response.status().is_success() => CheckStatus::Ok,
        Ok(Ok(response)) => {
            tracing::warn!(status = %response.status(), "readiness check: content api returned error");
            CheckStatus::Error
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "readiness check: content api request failed");
            CheckStatus::Error
        }
        Err(_) => {
            tracing::warn!("readiness check: content api check timed out");
            CheckStatus::Error
        }
    }
}
