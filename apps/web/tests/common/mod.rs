//! 統合テスト共通のフェイク API
//!
//! 認証 API とコンテンツ API を 127.0.0.1 の空きポートで起動する。

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    Json,
    Router,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// フェイク API が受け取ったリクエスト
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path:       String,
    pub query:      Option<String>,
    pub request_id: Option<String>,
}

#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Recorded>>>);

impl Recorder {
    fn push(&self, path: String, query: Option<String>, headers: &HeaderMap) {
        let request_id = headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.0.lock().unwrap().push(Recorded {
            path,
            query,
            request_id,
        });
    }

    pub fn all(&self) -> Vec<Recorded> {
        self.0.lock().unwrap().clone()
    }
}

pub struct FakeApi {
    pub base_url: String,
    pub recorder: Recorder,
}

/// ルーターを空きポートで起動し、ベース URL を返す
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// バックエンドのスキーマどおりのアドベンチャー
///
/// 距離・標高はバックエンドの項目名、タグは `{ id, name }` のみ。
pub fn adventure_json(id: u64, slug: &str, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "slug": slug,
        "description": "Zwei Tage Schotter",
        "content": "Tag 1\nTag 2",
        "distance": 180.5,
        "elevation_gain": 2400,
        "location": "Schwäbische Alb",
        "images": null,
        "tags": [{ "id": 1, "name": "Gravel" }],
        "created_at": "2024-06-01T07:30:00",
        "published_at": "2024-06-03T12:00:00",
        "is_published": true
    })
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

async fn token(Form(credentials): Form<Credentials>) -> Response {
    match (credentials.username.as_str(), credentials.password.as_str()) {
        ("good", "good") => Json(json!({ "access_token": "t1", "token_type": "bearer" })).into_response(),
        ("member", "member") => {
            Json(json!({ "access_token": "t2", "token_type": "bearer" })).into_response()
        }
        ("noprofile", "noprofile") => {
            Json(json!({ "access_token": "t3", "token_type": "bearer" })).into_response()
        }
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Invalid credentials" })),
        )
            .into_response(),
    }
}

async fn me(headers: HeaderMap) -> Response {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    match auth {
        "Bearer t1" => Json(json!({ "id": 1, "username": "ria", "email": "ria@example.com", "is_admin": true })).into_response(),
        "Bearer t2" => Json(json!({ "id": 2, "username": "max", "is_admin": false })).into_response(),
        "Bearer t3" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Could not validate credentials" })),
        )
            .into_response(),
    }
}

async fn list(State(recorder): State<Recorder>, RawQuery(query): RawQuery, headers: HeaderMap) -> Response {
    recorder.push("/api/adventures/".to_string(), query, &headers);
    Json(json!([
        adventure_json(1, "alpen", "Quer durch die Alpen"),
        adventure_json(2, "jura", "Jura-Runde"),
    ]))
    .into_response()
}

async fn by_slug(State(recorder): State<Recorder>, Path(slug): Path<String>, headers: HeaderMap) -> Response {
    recorder.push(format!("/api/adventures/slug/{slug}"), None, &headers);
    match slug.as_str() {
        "alpen" => Json(adventure_json(1, "alpen", "Quer durch die Alpen")).into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Adventure not found" })),
        )
            .into_response(),
    }
}

async fn by_id(State(recorder): State<Recorder>, Path(id): Path<String>, headers: HeaderMap) -> Response {
    recorder.push(format!("/api/adventures/{id}"), None, &headers);
    match id.as_str() {
        "1" => Json(adventure_json(1, "alpen", "Quer durch die Alpen")).into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Adventure not found" })),
        )
            .into_response(),
    }
}

/// 正常に応答するフェイク API を起動する
///
/// - `good` / `good`: 管理者（トークン `t1`）
/// - `member` / `member`: 一般ユーザー（トークン `t2`）
/// - `noprofile` / `noprofile`: トークンは発行されるがプロフィール取得が 500
pub async fn spawn_fake_api() -> FakeApi {
    let recorder = Recorder::default();
    let router = Router::new()
        .route("/api/v1/auth/token", post(token))
        .route("/api/v1/auth/me", get(me))
        .route("/api/adventures/", get(list))
        .route("/api/adventures/slug/{slug}", get(by_slug))
        .route("/api/adventures/{id}", get(by_id))
        .with_state(recorder.clone());

    FakeApi {
        base_url: serve(router).await,
        recorder,
    }
}

/// すべてのリクエストに 500 を返すフェイク API を起動する
pub async fn spawn_failing_api() -> String {
    let router = Router::new().fallback(|| async {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "boom" })),
        )
    });
    serve(router).await
}

/// 接続を受け付けないアドレス
///
/// 一度バインドしたポートを解放して返す。
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
