//! # ルートガード
//!
//! ナビゲーション（リクエスト）ごとに 1 回評価し、許可するかリダイレクトするかを決める。
//!
//! ## 判定順序
//!
//! 1. 管理画面配下（`/admin` で始まり、ログインページ以外）
//!    - 未認証 → ログインページ
//!    - 認証済みだが管理者でない → トップページ
//!    - 管理者 → 許可
//! 2. ログインページかつ認証済み（ロール問わず）→ 管理画面トップ
//! 3. それ以外 → 許可
//!
//! 1 はログインページを除外しているため、2 は 1 でリダイレクトされなかった場合にのみ到達する。
//! 前方一致は単純な文字列比較で、`/administrator` も管理画面配下として扱う。

use crate::session::AuthStatus;

/// 管理画面のパスプレフィックス
pub const ADMIN_PREFIX: &str = "/admin";

/// ログインページ
pub const LOGIN_PATH: &str = "/admin/login";

/// ログイン済みユーザーの遷移先
pub const ADMIN_LANDING_PATH: &str = "/admin";

/// サイトのトップ
pub const ROOT_PATH: &str = "/";

/// ガードの判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// そのまま遷移を許可する
    Allow,
    /// 指定パスへリダイレクトする
    Redirect(&'static str),
}

/// 遷移先パスと認証状態から判定する
pub fn evaluate(path: &str, status: &AuthStatus) -> GuardDecision {
    if path.starts_with(ADMIN_PREFIX) && path != LOGIN_PATH {
        if !status.is_authenticated() {
            return GuardDecision::Redirect(LOGIN_PATH);
        }
        if !status.is_admin() {
            return GuardDecision::Redirect(ROOT_PATH);
        }
        return GuardDecision::Allow;
    }

    if path == LOGIN_PATH && status.is_authenticated() {
        return GuardDecision::Redirect(ADMIN_LANDING_PATH);
    }

    GuardDecision::Allow
}
