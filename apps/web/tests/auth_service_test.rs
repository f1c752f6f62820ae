//! # 認証サービスの統合テスト
//!
//! 実際の HTTP クライアントとフェイク認証 API、インメモリトークンストアを組み合わせて検証する。

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use sattl_domain::session::AuthStatus;
use sattl_infra::{InMemoryTokenStore, TokenStore};
use sattl_web::{
    client::{ApiError, AuthApiClientImpl},
    service::{AuthService, AuthSession, LoginError},
};
use serde_json::json;

fn session_for(base_url: &str, store: &InMemoryTokenStore) -> AuthSession {
    let service = AuthService::new(
        Arc::new(store.clone()),
        Arc::new(AuthApiClientImpl::new(base_url)),
    );
    service.session("s1")
}

#[tokio::test]
async fn test_不正な資格情報ではサーバーのdetailを返しセッションを空にする() {
    // Given
    let api = common::spawn_fake_api().await;
    let store = InMemoryTokenStore::new();
    store.set_token("s1", "old").await.unwrap();
    store
        .set_user_data("s1", &json!({ "is_admin": true }))
        .await
        .unwrap();
    let session = session_for(&api.base_url, &store);

    // When
    let err = session.login("bad", "bad").await.unwrap_err();

    // Then
    assert_eq!(err.message(), "Invalid credentials");
    assert!(matches!(err, LoginError::Rejected { status: 401, .. }));
    assert_eq!(store.get_token("s1").await.unwrap(), None);
    assert_eq!(store.get_user_data("s1").await.unwrap(), None);
}

#[tokio::test]
async fn test_正しい資格情報ではトークンとプロフィールを保存する() {
    // Given
    let api = common::spawn_fake_api().await;
    let store = InMemoryTokenStore::new();
    let session = session_for(&api.base_url, &store);

    // When
    let session = session.login("good", "good").await.unwrap();

    // Then
    assert_eq!(session.get_token().await.as_deref(), Some("t1"));
    assert!(session.is_admin().await);
    assert_eq!(
        store.get_user_data(session.session_id()).await.unwrap(),
        Some(json!({
            "id": 1,
            "username": "ria",
            "email": "ria@example.com",
            "is_admin": true
        }))
    );
}

#[tokio::test]
async fn test_一般ユーザーは認証済みだが管理者ではない() {
    let api = common::spawn_fake_api().await;
    let store = InMemoryTokenStore::new();
    let session = session_for(&api.base_url, &store);

    let session = session.login("member", "member").await.unwrap();

    assert!(session.is_authenticated().await);
    assert!(!session.is_admin().await);
}

#[tokio::test]
async fn test_プロフィール取得に失敗してもログインは成功する() {
    let api = common::spawn_fake_api().await;
    let store = InMemoryTokenStore::new();
    let session = session_for(&api.base_url, &store);

    let session = session.login("noprofile", "noprofile").await.unwrap();

    assert_eq!(session.status().await.unwrap(), AuthStatus::ProfileUnknown);
    assert!(!session.is_admin().await);
}

#[tokio::test]
async fn test_認証apiに到達できなければネットワークエラー() {
    let base_url = common::unreachable_base_url().await;
    let store = InMemoryTokenStore::new();
    let session = session_for(&base_url, &store);

    let err = session.login("good", "good").await.unwrap_err();

    assert!(matches!(err, LoginError::Api(ApiError::NetworkFailure(_))));
    assert_eq!(err.message(), "Login fehlgeschlagen");
    assert!(!session.is_authenticated().await);
}

#[tokio::test]
async fn test_ログアウト後は未認証になる() {
    let api = common::spawn_fake_api().await;
    let store = InMemoryTokenStore::new();
    let session = session_for(&api.base_url, &store)
        .login("good", "good")
        .await
        .unwrap();

    session.logout().await.unwrap();

    assert!(!session.is_authenticated().await);
    assert!(!session.is_admin().await);
}

#[tokio::test]
async fn test_ログイン前のセッションidに植え付けた状態は引き継がれない() {
    let api = common::spawn_fake_api().await;
    let store = InMemoryTokenStore::new();
    store.set_token("s1", "planted").await.unwrap();
    let session = session_for(&api.base_url, &store);

    let rotated = session.login("good", "good").await.unwrap();

    assert_ne!(rotated.session_id(), "s1");
    assert_eq!(store.get_token("s1").await.unwrap(), None);
    assert!(!session.is_authenticated().await);
    assert!(rotated.is_admin().await);
}
