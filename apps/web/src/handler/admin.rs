//! # 管理画面ハンドラ
//!
//! 管理画面配下への到達可否はルートガードが判定済みのため、ここでは認可を行わない。
//!
//! - `GET /admin` - ダッシュボード（プロフィールと全アドベンチャー、`?status=` で絞り込み）
//! - `GET /admin/adventures/{id}` - 未公開を含む詳細
//! - `GET /admin/login`, `POST /admin/login` - ログインフォーム
//! - `POST /logout` - ログアウト

use std::sync::Arc;

use axum::{
   Extension,
   Form,
   extract::{Path, Query, State},
   http::StatusCode,
   response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use sattl_domain::{
   DomainError,
   adventure::AdventureStatus,
   route_guard::{ADMIN_LANDING_PATH, ROOT_PATH},
};
use serde::{Deserialize, Serialize};

use super::{PageState, load_nav};
use crate::{
   client::AdventureQuery,
   middleware::build_session_cookie,
   service::{AuthSession, LoginError},
   view::{AdventureCard, Nav, adventure_context, page_context},
};

/// ダッシュボードの絞り込み条件
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
   #[serde(default)]
   pub status: Option<String>,
}

impl DashboardQuery {
   /// 一覧 API への問い合わせ条件に変換する
   ///
   /// 未指定または空文字は絞り込みなし。
   fn to_adventure_query(&self) -> Result<AdventureQuery, DomainError> {
      let status = match self.status.as_deref() {
         None | Some("") => None,
         Some(raw) => Some(raw.parse::<AdventureStatus>()?),
      };
      Ok(AdventureQuery {
         status,
         limit: None,
      })
   }
}

/// ログインフォーム
#[derive(Debug, Deserialize)]
pub struct LoginForm {
   #[serde(default)]
   pub username: String,
   #[serde(default)]
   pub password: String,
}

/// ダッシュボードに表示するプロフィール
#[derive(Debug, Serialize)]
struct ProfileView {
   display_name: String,
   email:        Option<String>,
}

/// ダッシュボード
#[tracing::instrument(skip_all)]
pub async fn dashboard(
   State(state): State<Arc<PageState>>,
   Extension(session): Extension<AuthSession>,
   Query(query): Query<DashboardQuery>,
) -> Response {
   let adventure_query = match query.to_adventure_query() {
      Ok(q) => q,
      Err(e) => {
         tracing::debug!(error = %e, "不正な絞り込み条件");
         let nav = load_nav(&session).await;
         return state.views.error(
            StatusCode::BAD_REQUEST,
            &nav,
            "Unbekannter Status-Filter.",
         );
      }
   };

   let (nav, profile, list) = tokio::join!(
      load_nav(&session),
      session.get_user_data(),
      state.adventure_service.get_adventures(adventure_query)
   );

   let profile = profile.map(|p| ProfileView {
      display_name: p.display_name().to_string(),
      email:        p.email,
   });
   let cards: Vec<_> = list.adventures.iter().map(AdventureCard::admin).collect();

   let mut context = page_context(&nav);
   context.insert("profile", &profile);
   context.insert("adventures", &cards);
   context.insert("total", &list.total);
   context.insert("load_failed", &list.error.is_some());
   context.insert("status_filter", &adventure_query.status);

   state
      .views
      .render(StatusCode::OK, "admin/dashboard.html", &context)
}

/// アドベンチャー詳細（ID 指定）
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn show_adventure_by_id(
   State(state): State<Arc<PageState>>,
   Extension(session): Extension<AuthSession>,
   Path(id): Path<String>,
) -> Response {
   let (nav, lookup) = tokio::join!(
      load_nav(&session),
      state.adventure_service.get_adventure_by_id(&id)
   );

   match &lookup.adventure {
      Some(adventure) => state.views.render(
         StatusCode::OK,
         "admin/adventure.html",
         &adventure_context(&nav, adventure, ADMIN_LANDING_PATH),
      ),
      None if lookup.is_not_found() => state.views.not_found(&nav),
      None => state.views.error(
         StatusCode::BAD_GATEWAY,
         &nav,
         "Das Abenteuer konnte gerade nicht geladen werden.",
      ),
   }
}

/// ログインフォームを表示する
pub async fn login_form(State(state): State<Arc<PageState>>) -> Response {
   render_login(&state, StatusCode::OK, "", None)
}

/// ログインする
///
/// 成功時は新しいセッション ID の Cookie を設定して管理画面へ 303 でリダイレクトし、
/// 失敗時はフォームをエラー付きで再表示する。
#[tracing::instrument(skip_all)]
pub async fn login(
   State(state): State<Arc<PageState>>,
   Extension(session): Extension<AuthSession>,
   jar: CookieJar,
   Form(form): Form<LoginForm>,
) -> Response {
   match session.login(&form.username, &form.password).await {
      Ok(session) => {
         let jar = jar.add(build_session_cookie(
            session.session_id(),
            state.secure_cookies,
         ));
         (jar, Redirect::to(ADMIN_LANDING_PATH)).into_response()
      }
      Err(e) => {
         let status = login_failure_status(&e);
         render_login(&state, status, &form.username, Some(e.message()))
      }
   }
}

/// ログアウトしてトップページへ戻る
///
/// ストアの削除に失敗してもリダイレクトする。
#[tracing::instrument(skip_all)]
pub async fn logout(Extension(session): Extension<AuthSession>) -> Response {
   if let Err(e) = session.logout().await {
      tracing::error!(
         error.category = "infrastructure",
         error.kind = "session",
         "ログアウト時のセッション削除に失敗しました: {}",
         e
      );
   }

   Redirect::to(ROOT_PATH).into_response()
}

fn login_failure_status(error: &LoginError) -> StatusCode {
   match error {
      LoginError::Rejected { .. } => StatusCode::UNAUTHORIZED,
      LoginError::Api(_) => StatusCode::BAD_GATEWAY,
      LoginError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
   }
}

fn render_login(
   state: &PageState,
   status: StatusCode,
   username: &str,
   error: Option<&str>,
) -> Response {
   let mut context = page_context(&Nav::default());
   context.insert("username", username);
   context.insert("error", &error);

   state.views.render(status, "admin/login.html", &context)
}
