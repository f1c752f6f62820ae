//! # アドベンチャーサービス
//!
//! コンテンツ API からの取得結果を「データ（または既定値）とエラー」の組にまとめる。
//! エラーを呼び出し側へ伝播させず、画面は常に描画できる状態を保つ。
//! キャッシュ・リトライは行わない。

use std::sync::Arc;

use sattl_domain::adventure::{Adventure, AdventureListPage, AdventureStatus};

use crate::client::{AdventureQuery, ApiError, ContentApiClient};

/// トップページに表示する件数
pub const HOME_PAGE_LIMIT: u32 = 6;

/// 一覧の取得結果
///
/// 失敗時は `adventures` が空で `error` に原因が入る。
#[derive(Debug, Clone, Default)]
pub struct AdventureList {
    pub adventures: Vec<Adventure>,
    /// 全件数（API がページ情報を返した場合はその値）
    pub total:      u64,
    pub error:      Option<ApiError>,
}

impl AdventureList {
    fn from_result(result: Result<AdventureListPage, ApiError>) -> Self {
        match result {
            Ok(page) => Self {
                total:      page.total,
                adventures: page.items,
                error:      None,
            },
            Err(e) => {
                tracing::error!(error = %e, "アドベンチャー一覧の取得に失敗しました");
                Self {
                    error: Some(e),
                    ..Self::default()
                }
            }
        }
    }
}

/// 1 件の取得結果
#[derive(Debug, Clone, Default)]
pub struct AdventureLookup {
    pub adventure: Option<Adventure>,
    pub error:     Option<ApiError>,
}

impl AdventureLookup {
    fn from_result(result: Result<Adventure, ApiError>) -> Self {
        match result {
            Ok(adventure) => Self {
                adventure: Some(adventure),
                error:     None,
            },
            Err(e) => {
                tracing::error!(error = %e, "アドベンチャーの取得に失敗しました");
                Self {
                    adventure: None,
                    error:     Some(e),
                }
            }
        }
    }

    /// API が 404 を返したか
    pub fn is_not_found(&self) -> bool {
        self.error.as_ref().is_some_and(ApiError::is_not_found)
    }
}

/// アドベンチャーサービス
#[derive(Clone)]
pub struct AdventureService {
    client: Arc<dyn ContentApiClient>,
}

impl AdventureService {
    pub fn new(client: Arc<dyn ContentApiClient>) -> Self {
        Self { client }
    }

    /// 全件を取得する
    pub async fn get_all_adventures(&self) -> AdventureList {
        self.get_adventures(AdventureQuery::default()).await
    }

    /// 条件付きで一覧を取得する
    pub async fn get_adventures(&self, query: AdventureQuery) -> AdventureList {
        AdventureList::from_result(self.client.list_adventures(&query).await)
    }

    /// トップページ用の公開済み最新アドベンチャー
    pub async fn get_latest_published(&self) -> AdventureList {
        self.get_adventures(AdventureQuery {
            status: Some(AdventureStatus::Published),
            limit:  Some(HOME_PAGE_LIMIT),
        })
        .await
    }

    /// ID で取得する
    pub async fn get_adventure_by_id(&self, id: &str) -> AdventureLookup {
        AdventureLookup::from_result(self.client.get_adventure(id).await)
    }

    /// スラッグで取得する
    pub async fn get_adventure_by_slug(&self, slug: &str) -> AdventureLookup {
        AdventureLookup::from_result(self.client.get_adventure_by_slug(slug).await)
    }
}
