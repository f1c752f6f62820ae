//! # ドメイン層エラー定義
//!
//! 入力値の解釈に失敗した場合など、ドメイン固有の例外状態を表現するエラー型。
//!
//! ## 使用例
//!
//! ```rust
//! use sattl_domain::{DomainError, adventure::AdventureStatus};
//!
//! let result: Result<AdventureStatus, DomainError> = "archived".parse();
//! assert!(result.is_err());
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 入力値がドメインのルールに違反している場合に使用する。
    #[error("バリデーションエラー: {0}")]
    Validation(String),
}
