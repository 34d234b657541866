//! User Name Value Object
//!
//! ユーザー名は公開ハンドル。ブログの著者名として表示される。
//!
//! ## 不変条件
//! - NFKC正規化と前後の空白除去の後に検証する
//! - 長さ: 3〜20文字
//! - 使用可能文字: ASCII英数字と `_ . -`
//! - 英数字を最低1文字含む

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

pub const USER_NAME_MIN_LENGTH: usize = 3;

pub const USER_NAME_MAX_LENGTH: usize = 20;

const ALLOWED_SPECIAL_CHARS: &[char] = &['_', '.', '-'];

/// Validated user name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    pub fn new(raw: impl AsRef<str>) -> AppResult<Self> {
        let normalized: String = raw.as_ref().nfkc().collect();
        let name = normalized.trim();

        if name.is_empty() {
            return Err(AppError::bad_request("Username is required"));
        }

        let length = name.chars().count();
        if length < USER_NAME_MIN_LENGTH {
            return Err(AppError::bad_request(format!(
                "Username must be at least {USER_NAME_MIN_LENGTH} characters"
            )));
        }
        if length > USER_NAME_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Username must be at most {USER_NAME_MAX_LENGTH} characters"
            )));
        }

        if let Some(bad) = name
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !ALLOWED_SPECIAL_CHARS.contains(c))
        {
            return Err(AppError::bad_request(format!(
                "Username contains invalid character '{bad}'. Only a-z, A-Z, 0-9, _, ., - are allowed"
            )));
        }

        if !name.chars().any(|c| c.is_ascii_alphanumeric()) {
            return Err(AppError::bad_request(
                "Username must contain at least one letter or digit",
            ));
        }

        Ok(Self(name.to_string()))
    }

    /// Rehydrate from a stored value
    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for ok in ["alice", "bob_99", "j.doe", "A-Team", "abc"] {
            assert!(UserName::new(ok).is_ok(), "{ok}");
        }
    }

    #[test]
    fn test_length_bounds() {
        assert!(UserName::new("ab").is_err());
        assert!(UserName::new("a".repeat(USER_NAME_MAX_LENGTH)).is_ok());
        assert!(UserName::new("a".repeat(USER_NAME_MAX_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_invalid_characters() {
        let err = UserName::new("alice smith").unwrap_err();
        assert!(err.message().contains("invalid character"));
        assert!(UserName::new("al!ce").is_err());
        assert!(UserName::new("___").is_err());
    }

    #[test]
    fn test_nfkc_and_trim() {
        // Fullwidth letters normalize to ASCII
        let name = UserName::new("  \u{FF41}lice ").unwrap();
        assert_eq!(name.as_str(), "alice");
    }
}
