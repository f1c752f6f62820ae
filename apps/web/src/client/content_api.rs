//! # コンテンツ API クライアント
//!
//! ## エンドポイント
//!
//! - `GET /api/adventures/` - アドベンチャー一覧（`status`, `limit` で絞り込み）
//! - `GET /api/adventures/{id}` - ID でアドベンチャーを取得
//! - `GET /api/adventures/slug/{slug}` - スラッグでアドベンチャーを取得
//!
//! 一覧はページング付きオブジェクトと素の配列のどちらも受け付ける。

use async_trait::async_trait;
use sattl_domain::adventure::{Adventure, AdventureListPage, AdventureListPayload, AdventureStatus};

use super::{ApiError, response::handle_response};
use crate::middleware::request_id::inject_request_id;

/// 一覧の絞り込み条件
///
/// 未指定の項目はクエリパラメータに含めない。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdventureQuery {
    pub status: Option<AdventureStatus>,
    pub limit:  Option<u32>,
}

impl AdventureQuery {
    /// クエリパラメータに変換する
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

/// コンテンツ API クライアントトレイト
///
/// テスト時にスタブを使用できるようトレイトで定義。
#[async_trait]
pub trait ContentApiClient: Send + Sync {
    /// 一覧を取得する
    async fn list_adventures(&self, query: &AdventureQuery) -> Result<AdventureListPage, ApiError>;

    /// ID で 1 件取得する
    async fn get_adventure(&self, id: &str) -> Result<Adventure, ApiError>;

    /// スラッグで 1 件取得する
    async fn get_adventure_by_slug(&self, slug: &str) -> Result<Adventure, ApiError>;
}

/// コンテンツ API クライアント実装
pub struct ContentApiClientImpl {
    base_url: String,
    client:   reqwest::Client,
}

impl ContentApiClientImpl {
    /// 新しい ContentApiClient を作成する
    ///
    /// # 引数
    ///
    /// - `base_url`: API のベース URL（例: `http://localhost:8000`）
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client:   reqwest::Client::new(),
        }
    }

    fn adventure_url(&self, path: &str) -> String {
        format!("{}/api/adventures/{}", self.base_url, path)
    }
}

#[async_trait]
impl ContentApiClient for ContentApiClientImpl {
    #[tracing::instrument(skip_all, level = "debug", fields(query = ?query))]
    async fn list_adventures(&self, query: &AdventureQuery) -> Result<AdventureListPage, ApiError> {
        let response = inject_request_id(self.client.get(self.adventure_url("")))
            .query(&query.to_pairs())
            .send()
            .await?;

        let payload: AdventureListPayload = handle_response(response).await?;
        Ok(payload.into_page())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %id))]
    async fn get_adventure(&self, id: &str) -> Result<Adventure, ApiError> {
        let url = self.adventure_url(&urlencoding::encode(id));
        let response = inject_request_id(self.client.get(&url)).send().await?;

        handle_response(response).await
    }

    #[tracing::instrument(skip_all, level = "debug", fields(slug = %slug))]
    async fn get_adventure_by_slug(&self, slug: &str) -> Result<Adventure, ApiError> {
        let url = self.adventure_url(&format!("slug/{}", urlencoding::encode(slug)));
        let response = inject_request_id(self.client.get(&url)).send().await?;

        handle_response(response).await
    }
}
