//! # ビュー
//!
//! Tera テンプレートの読み込みと描画、テンプレートに渡す表示用の型を提供する。
//! テンプレートはバイナリに埋め込む。

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use sattl_domain::{adventure::Adventure, session::AuthStatus};
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::internal_error_response;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("_adventure_card.html", include_str!("../templates/_adventure_card.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("adventures.html", include_str!("../templates/adventures.html")),
    ("adventure.html", include_str!("../templates/adventure.html")),
    ("not_found.html", include_str!("../templates/not_found.html")),
    ("error.html", include_str!("../templates/error.html")),
    ("admin/login.html", include_str!("../templates/admin/login.html")),
    ("admin/dashboard.html", include_str!("../templates/admin/dashboard.html")),
    ("admin/adventure.html", include_str!("../templates/admin/adventure.html")),
];

/// テンプレートエンジン
pub struct Views {
    tera: Tera,
}

impl Views {
    /// 埋め込みテンプレートを読み込む
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        Ok(Self { tera })
    }

    /// テンプレートを描画してレスポンスにする
    ///
    /// 描画に失敗した場合はログを残して 500 ページを返す。
    pub fn render(&self, status: StatusCode, template: &str, context: &Context) -> Response {
        match self.tera.render(template, context) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!(template, error = ?e, "テンプレートの描画に失敗しました");
                internal_error_response()
            }
        }
    }

    /// 404 ページ
    pub fn not_found(&self, nav: &Nav) -> Response {
        self.render(StatusCode::NOT_FOUND, "not_found.html", &page_context(nav))
    }

    /// メッセージ付きのエラーページ
    pub fn error(&self, status: StatusCode, nav: &Nav, message: &str) -> Response {
        let mut context = page_context(nav);
        context.insert("message", message);
        self.render(status, "error.html", &context)
    }
}

/// ナビゲーションに表示する認証状態
///
/// `csrf_token` はログアウトフォームに埋め込む。
#[derive(Debug, Clone, Default, Serialize)]
pub struct Nav {
    pub is_authenticated: bool,
    pub is_admin:         bool,
    pub display_name:     String,
    pub csrf_token:       Option<String>,
}

impl From<&AuthStatus> for Nav {
    fn from(status: &AuthStatus) -> Self {
        Self {
            is_authenticated: status.is_authenticated(),
            is_admin:         status.is_admin(),
            display_name:     status
                .profile()
                .map(|p| p.display_name().to_string())
                .unwrap_or_default(),
            csrf_token:       None,
        }
    }
}

/// 全ページ共通のコンテキスト
pub fn page_context(nav: &Nav) -> Context {
    let mut context = Context::new();
    context.insert("nav", nav);
    context
}

/// 一覧に表示するカード
#[derive(Debug, Serialize)]
pub struct AdventureCard<'a> {
    pub id:              &'a str,
    pub href:            Option<String>,
    pub title:           &'a str,
    pub description:     &'a str,
    pub date:            Option<String>,
    pub cover_image_url: Option<&'a str>,
    pub distance_km:     Option<f64>,
    pub elevation_m:     Option<f64>,
    pub duration_days:   Option<f64>,
    pub difficulty:      Option<&'a str>,
    pub tags:            Vec<&'a str>,
    pub is_published:    bool,
}

impl<'a> AdventureCard<'a> {
    /// 公開ページ用（スラッグでリンク）
    ///
    /// スラッグの無い記事は公開ページで開けないため、リンクを付けない。
    pub fn public(adventure: &'a Adventure) -> Self {
        let href = adventure
            .slug
            .as_deref()
            .map(|slug| format!("/adventures/{}", urlencoding::encode(slug)));
        Self::with_href(adventure, href)
    }

    /// 管理画面用（ID でリンク）
    pub fn admin(adventure: &'a Adventure) -> Self {
        let href = format!("/admin/adventures/{}", urlencoding::encode(adventure.id.as_str()));
        Self::with_href(adventure, Some(href))
    }

    fn with_href(adventure: &'a Adventure, href: Option<String>) -> Self {
        Self {
            id:              adventure.id.as_str(),
            href,
            title:           &adventure.title,
            description:     &adventure.description,
            date:            adventure.display_date(),
            cover_image_url: adventure.cover_image_url(),
            distance_km:     adventure.distance_km,
            elevation_m:     adventure.elevation_m,
            duration_days:   adventure.duration_days,
            difficulty:      adventure.difficulty.as_deref(),
            tags:            adventure.tags.iter().map(|t| t.name.as_str()).collect(),
            is_published:    adventure.is_published,
        }
    }
}

/// 詳細ページのコンテキスト
pub fn adventure_context(nav: &Nav, adventure: &Adventure, back_link: &str) -> Context {
    let mut context = page_context(nav);
    context.insert("adventure", adventure);
    context.insert("date", &adventure.display_date());
    context.insert("cover_image_url", &adventure.cover_image_url());
    context.insert("back_link", back_link);
    context
}
