//! # アドベンチャー
//!
//! コンテンツ API から取得するアドベンチャー（1 回の旅・ルートを記述するブログ記事）を定義する。
//!
//! フロントエンドは読み取り専用で、ここで定義する型はすべて API レスポンスの写しである。
//!
//! ## 互換性
//!
//! - `id` は JSON の文字列・整数のどちらでも受け付ける（バックエンドは整数を返す）
//! - 一覧エンドポイントはページ形式 `{ items, total, page, size, pages }` と
//!   素の配列の両方を受け付ける（[`AdventureListPayload`]）
//! - 日時はタイムゾーン付き（RFC 3339）とタイムゾーンなしの両方を受け付ける
//! - バックエンドの項目名 `distance` / `elevation_gain` は `distance_km` / `elevation_m` として読む
//! - `slug` は null・省略を許容する（スラッグの無い記事は公開ページからリンクしない）
//! - タグはバックエンドが `{ id, name }` だけを返すため `slug` を省略可能とする

use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use derive_more::Display;
use serde::{Deserialize, Deserializer, Serialize};

use crate::DomainError;

/// アドベンチャー ID
///
/// API 上は整数または文字列。パス埋め込み用に常に文字列として保持する。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Display)]
#[display("{_0}")]
pub struct AdventureId(String);

impl AdventureId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for AdventureId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Number(n) => Self(n.to_string()),
        })
    }
}

/// API が返す日時文字列
///
/// 解釈できない値もそのまま保持し、表示時にのみパースを試みる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 日付部分を `DD.MM.YYYY` 形式で返す
    ///
    /// RFC 3339 とタイムゾーンなしの ISO 8601 の順に解釈する。
    /// どちらにも当てはまらない場合は `None`。
    pub fn date_label(&self) -> Option<String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.0) {
            return Some(dt.format("%d.%m.%Y").to_string());
        }
        NaiveDateTime::parse_from_str(&self.0, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|dt| dt.format("%d.%m.%Y").to_string())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// タグ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id:   AdventureId,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

/// 画像
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id:          AdventureId,
    pub url:         String,
    #[serde(default)]
    pub alt_text:    Option<String>,
    #[serde(default)]
    pub width:       Option<u32>,
    #[serde(default)]
    pub height:      Option<u32>,
    #[serde(default)]
    pub is_featured: Option<bool>,
}

/// アドベンチャー
///
/// 任意項目（距離・標高・日数・難易度など）は API が省略した場合 `None` になる。
/// `images` / `tags` は省略時に空配列として扱う。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adventure {
    pub id:                 AdventureId,
    pub title:              String,
    #[serde(default)]
    pub slug:               Option<String>,
    #[serde(default)]
    pub description:        String,
    #[serde(default)]
    pub content:            String,
    #[serde(default, alias = "distance")]
    pub distance_km:        Option<f64>,
    #[serde(default, alias = "elevation_gain")]
    pub elevation_m:        Option<f64>,
    #[serde(default)]
    pub duration_days:      Option<f64>,
    #[serde(default)]
    pub difficulty:         Option<String>,
    #[serde(default)]
    pub location:           Option<String>,
    #[serde(default)]
    pub featured_image_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images:             Vec<Image>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags:               Vec<Tag>,
    #[serde(default)]
    pub route_gpx_url:      Option<String>,
    pub created_at:         Timestamp,
    #[serde(default)]
    pub updated_at:         Option<Timestamp>,
    #[serde(default)]
    pub published_at:       Option<Timestamp>,
    #[serde(default)]
    pub is_published:       bool,
}

impl Adventure {
    /// 一覧・詳細に表示する日付
    ///
    /// 公開日があれば公開日、なければ作成日を使う。
    pub fn display_date(&self) -> Option<String> {
        self.published_at
            .as_ref()
            .and_then(Timestamp::date_label)
            .or_else(|| self.created_at.date_label())
    }

    /// アイキャッチ画像の URL
    ///
    /// `featured_image_url` が無い場合は `is_featured` の画像、次に先頭の画像を使う。
    pub fn cover_image_url(&self) -> Option<&str> {
        self.featured_image_url.as_deref().or_else(|| {
            self.images
                .iter()
                .find(|img| img.is_featured == Some(true))
                .or_else(|| self.images.first())
                .map(|img| img.url.as_str())
        })
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// 一覧ページ
///
/// ページング付き一覧の 1 ページ分。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdventureListPage {
    pub items: Vec<Adventure>,
    pub total: u64,
    pub page:  u64,
    pub size:  u64,
    pub pages: u64,
}

impl AdventureListPage {
    /// 素の配列を 1 ページとして扱う
    pub fn single(items: Vec<Adventure>) -> Self {
        let total = items.len() as u64;
        Self {
            items,
            total,
            page: 1,
            size: total,
            pages: 1,
        }
    }
}

/// 一覧エンドポイントのレスポンス形状
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdventureListPayload {
    Page(AdventureListPage),
    Items(Vec<Adventure>),
}

impl AdventureListPayload {
    pub fn into_page(self) -> AdventureListPage {
        match self {
            Self::Page(page) => page,
            Self::Items(items) => AdventureListPage::single(items),
        }
    }
}

/// 一覧のステータスフィルタ
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AdventureStatus {
    /// 下書き
    Draft,
    /// 公開済み
    Published,
    /// 計画中
    Planned,
}

impl std::str::FromStr for AdventureStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "planned" => Ok(Self::Planned),
            _ => Err(DomainError::Validation(format!(
                "不正なアドベンチャーステータス: {}",
                s
            ))),
        }
    }
}
