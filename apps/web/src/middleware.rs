//! # ミドルウェア
//!
//! ページ配信用のミドルウェアを提供する。
//!
//! 適用順（外側から）: Request ID → セッション → ルートガード → CSRF 検証 → ハンドラ

mod cache_control;
mod csrf;
pub mod request_id;
mod route_guard;
mod session;

pub use cache_control::no_store;
pub use csrf::{CSRF_FORM_FIELD, csrf_guard};
pub use route_guard::route_guard;
pub(crate) use session::build_session_cookie;
pub use session::{SESSION_COOKIE_NAME, SessionState, attach_session};
