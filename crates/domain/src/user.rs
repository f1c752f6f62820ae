//! # ユーザープロフィール
//!
//! 認証 API の `GET /api/v1/auth/me` が返すユーザー情報。
//!
//! セッションに保存され、取得のたびに丸ごと置き換えられる（マージしない）。
//! 既知のフィールド以外も `extra` に保持し、保存・復元で失われないようにする。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::adventure::AdventureId;

/// ユーザープロフィール
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id:        Option<AdventureId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username:  Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email:     Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// 管理者フラグ
    ///
    /// 省略時は `false`。`true` 以外はすべて非管理者として扱う。
    #[serde(default)]
    pub is_admin:  bool,
    #[serde(flatten)]
    pub extra:     Map<String, Value>,
}

impl UserProfile {
    /// 画面表示用の名前
    ///
    /// `full_name` → `username` → `email` の順で最初に存在するものを返す。
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .or(self.username.as_deref())
            .or(self.email.as_deref())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_is_admin省略時はfalse() {
        let profile: UserProfile = serde_json::from_value(json!({ "username": "ria" })).unwrap();

        assert!(!profile.is_admin);
    }

    #[test]
    fn test_未知のフィールドを保持したまま往復できる() {
        let raw = json!({
            "id": 1,
            "username": "admin",
            "email": "admin@example.com",
            "is_admin": true,
            "avatar_url": "/me.png"
        });

        let profile: UserProfile = serde_json::from_value(raw.clone()).unwrap();
        let restored = serde_json::to_value(&profile).unwrap();

        assert!(profile.is_admin);
        assert_eq!(profile.extra.get("avatar_url"), Some(&json!("/me.png")));
        assert_eq!(restored["avatar_url"], raw["avatar_url"]);
        assert_eq!(restored["id"], json!("1"));
    }

    #[test]
    fn test_表示名はfull_nameを優先する() {
        let profile: UserProfile = serde_json::from_value(json!({
            "username": "ria",
            "full_name": "Ria Schwob"
        }))
        .unwrap();

        assert_eq!(profile.display_name(), "Ria Schwob");
    }

    #[test]
    fn test_表示名はusernameにフォールバックする() {
        let profile: UserProfile = serde_json::from_value(json!({ "username": "ria" })).unwrap();

        assert_eq!(profile.display_name(), "ria");
    }
}
