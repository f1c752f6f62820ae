//! # API クライアントエラー
//!
//! 認証 API・コンテンツ API 共通のエラー型。
//! 呼び出し側が「到達できなかった」「拒否された」「解釈できなかった」を区別できるようにする。

use thiserror::Error;

/// API 呼び出しのエラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// 接続失敗・タイムアウトなど、レスポンスを受け取れなかった
    #[error("ネットワークエラー: {0}")]
    NetworkFailure(String),

    /// 2xx 以外のステータスが返された
    ///
    /// `detail` はレスポンスボディの `detail` フィールド（文字列の場合のみ）。
    #[error("API がステータス {code} を返しました")]
    HttpStatus { code: u16, detail: Option<String> },

    /// レスポンスボディを期待した形式として解釈できなかった
    #[error("レスポンスの解釈に失敗しました: {0}")]
    DecodeFailure(String),
}

impl ApiError {
    /// HTTP ステータスコード（ステータスエラーの場合のみ）
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    /// サーバーが返したエラー詳細
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::HttpStatus { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::DecodeFailure(err.to_string())
        } else {
            ApiError::NetworkFailure(err.to_string())
        }
    }
}
