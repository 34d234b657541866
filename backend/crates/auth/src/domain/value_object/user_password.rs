//! User Password Value Object
//!
//! Domain wrapper over `platform::password`.
//!
//! ## Usage
//! ```rust
//! use auth::domain::value_object::user_password::{RawPassword, UserPassword};
//! use platform::password::PasswordHashParams;
//!
//! let raw = RawPassword::new("Secret123".to_string()).unwrap();
//! let hashed = UserPassword::from_raw(&raw, &PasswordHashParams::minimal(), None).unwrap();
//! assert!(hashed.verify(&raw, None));
//! ```

use platform::password::{
    ClearTextPassword, HashedPassword, PasswordHashError, PasswordHashParams,
};
use std::fmt;

use crate::error::{AuthError, AuthResult};

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input, zeroized on drop
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Accept a new password (registration, reset)
    ///
    /// ## Errors
    /// `AuthError::PasswordValidation` carrying the policy message
    pub fn new(raw: String) -> AuthResult<Self> {
        ClearTextPassword::new(raw)
            .map(Self)
            .map_err(|e| AuthError::PasswordValidation(e.to_string()))
    }

    /// Wrap a login attempt. No policy check; only the digest decides.
    pub fn candidate(raw: String) -> Self {
        Self(ClearTextPassword::candidate(raw))
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Argon2id digest in PHC format
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    pub fn from_raw(
        raw: &RawPassword,
        params: &PasswordHashParams,
        pepper: Option<&[u8]>,
    ) -> AuthResult<Self> {
        raw.inner()
            .hash(params, pepper)
            .map(Self)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Rehydrate from the stored PHC string
    pub fn from_phc_string(phc_string: impl Into<String>) -> Result<Self, PasswordHashError> {
        HashedPassword::from_phc_string(phc_string).map(Self)
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    /// `false` on mismatch or a malformed digest
    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(raw.inner(), pepper)
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
