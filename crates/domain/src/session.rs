//! # セッション状態
//!
//! トークンとユーザープロフィールの 2 スロットから導出される認証状態。
//!
//! | トークン | プロフィール | 状態 |
//! |---------|-------------|------|
//! | なし | （無視） | [`AuthStatus::LoggedOut`] |
//! | あり | なし / 解釈不能 | [`AuthStatus::ProfileUnknown`] |
//! | あり | あり | [`AuthStatus::LoggedIn`] |
//!
//! プロフィールはトークンが存在する場合にのみ意味を持つ。
//! トークンの有効期限はローカルでは管理せず、API 呼び出しの失敗で初めて判明する。

use serde_json::Value;

use crate::user::UserProfile;

/// 認証状態
///
/// 「未ログイン」と「ログイン済みだがプロフィール取得に失敗した」を区別する。
#[derive(Debug, Clone, PartialEq)]
pub enum AuthStatus {
    /// トークンなし
    LoggedOut,
    /// トークンはあるがプロフィールが未取得
    ProfileUnknown,
    /// トークンとプロフィールが揃っている
    LoggedIn(UserProfile),
}

impl AuthStatus {
    /// セッションの 2 スロットから状態を導出する
    ///
    /// プロフィールが [`UserProfile`] として解釈できない場合は
    /// [`ProfileUnknown`](AuthStatus::ProfileUnknown) とする。
    pub fn from_slots(token: Option<&str>, user_data: Option<&Value>) -> Self {
        if token.is_none_or(str::is_empty) {
            return Self::LoggedOut;
        }

        match user_data.and_then(|v| serde_json::from_value::<UserProfile>(v.clone()).ok()) {
            Some(profile) => Self::LoggedIn(profile),
            None => Self::ProfileUnknown,
        }
    }

    /// トークンが存在するか
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::LoggedOut)
    }

    /// 認証済みかつ管理者フラグが `true` か
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::LoggedIn(profile) if profile.is_admin)
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            Self::LoggedIn(profile) => Some(profile),
            _ => None,
        }
    }
}
