use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role
///
/// Stored and serialized by code (`admin`, `editor`, `author`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Editor,
    /// Legacy rows and clients may still say `penulis`.
    #[default]
    #[serde(alias = "penulis")]
    Author,
}

impl UserRole {
    #[inline]
    pub const fn code(&self) -> &'static str {
        use UserRole::*;
        match self {
            Admin => "admin",
            Editor => "editor",
            Author => "author",
        }
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Parse a role code. Unknown codes are `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        use UserRole::*;
        match code {
            "admin" => Some(Admin),
            "editor" => Some(Editor),
            "author" | "penulis" => Some(Author),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_from_code() {
        assert_eq!(UserRole::from_code("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_code("editor"), Some(UserRole::Editor));
        assert_eq!(UserRole::from_code("author"), Some(UserRole::Author));
        assert_eq!(UserRole::from_code("penulis"), Some(UserRole::Author));
        assert_eq!(UserRole::from_code("super_admin"), None);
    }

    #[test]
    fn test_user_role_default_is_author() {
        assert_eq!(UserRole::default(), UserRole::Author);
    }

    #[test]
    fn test_user_role_serde() {
        assert_eq!(serde_json::to_string(&UserRole::Editor).unwrap(), "\"editor\"");
        let legacy: UserRole = serde_json::from_str("\"penulis\"").unwrap();
        assert_eq!(legacy, UserRole::Author);
        assert!(serde_json::from_str::<UserRole>("\"root\"").is_err());
    }

    #[test]
    fn test_user_role_checks() {
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::Editor.is_admin());
        assert!(!UserRole::Author.is_admin());
    }
}
