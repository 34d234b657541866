//! Password Policy, Hashing and Verification
//!
//! - Strength policy: at least 8 characters with an ASCII uppercase letter,
//!   an ASCII lowercase letter and a digit
//! - Argon2id hashing with tunable cost and an optional pepper
//! - Zeroization of clear text
//!
//! Policy is checked on the raw input. NFKC normalization is applied only to
//! the bytes fed to Argon2, on both the hashing and the verifying side.

use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

// ============================================================================
// Constants
// ============================================================================

pub const MIN_PASSWORD_LENGTH: usize = 8;

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("password must be at least {min} characters")]
    TooShort { min: usize, actual: usize },

    /// Missing one of the required character classes
    #[error(
        "password must include at least one uppercase letter, one lowercase letter, and one number"
    )]
    MissingCharacterClass,
}

/// Password hashing errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,

    #[error("Invalid Argon2 parameters: {0}")]
    InvalidParams(String),
}

// ============================================================================
// Hashing parameters
// ============================================================================

/// Argon2id cost parameters
///
/// Defaults follow the OWASP baseline: m=19456 KiB, t=2, p=1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHashParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordHashParams {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl PasswordHashParams {
    /// Cheapest parameters Argon2 accepts. For tests only.
    pub const fn minimal() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }

    fn argon2(&self) -> Result<Argon2<'static>, PasswordHashError> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| PasswordHashError::InvalidParams(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// Does not implement `Clone`. Debug output is redacted.
///
/// ## Examples
/// ```rust
/// use platform::password::ClearTextPassword;
///
/// let password = ClearTextPassword::new("Secret123".to_string()).unwrap();
/// assert!(ClearTextPassword::new("secret123".to_string()).is_err());
/// # drop(password);
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Accept a password that satisfies the strength policy
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let candidate = Self(raw);
        validate_strength(&candidate.0)?;
        Ok(candidate)
    }

    /// Wrap a candidate without checking policy.
    ///
    /// Used on the login path: a stored digest decides, not the policy.
    pub fn candidate(raw: String) -> Self {
        Self(raw)
    }

    fn normalized(&self) -> Zeroizing<Vec<u8>> {
        let normalized: String = self.0.nfkc().collect();
        Zeroizing::new(normalized.into_bytes())
    }

    fn peppered(&self, pepper: Option<&[u8]>) -> Zeroizing<Vec<u8>> {
        let mut bytes = self.normalized();
        if let Some(p) = pepper {
            bytes.extend_from_slice(p);
        }
        bytes
    }

    /// Hash the password using Argon2id with a fresh 128-bit salt
    pub fn hash(
        &self,
        params: &PasswordHashParams,
        pepper: Option<&[u8]>,
    ) -> Result<HashedPassword, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = params.argon2()?;

        let hash = argon2
            .hash_password(&self.peppered(pepper), &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(HashedPassword {
            hash: hash.to_string(),
        })
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

/// Check a raw password against the strength policy
///
/// Character classes are ASCII only: `É` does not count as uppercase.
/// There is no upper bound here; request bodies are size-limited upstream.
pub fn validate_strength(raw: &str) -> Result<(), PasswordPolicyError> {
    let char_count = raw.chars().count();

    if char_count < MIN_PASSWORD_LENGTH {
        return Err(PasswordPolicyError::TooShort {
            min: MIN_PASSWORD_LENGTH,
            actual: char_count,
        });
    }

    let has_upper = raw.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = raw.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = raw.chars().any(|c| c.is_ascii_digit());
    if !(has_upper && has_lower && has_digit) {
        return Err(PasswordPolicyError::MissingCharacterClass);
    }

    Ok(())
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Argon2id hash in PHC string format
///
/// The PHC string carries algorithm, version, cost parameters and salt, so
/// verification works across parameter changes.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Create from PHC string (e.g., from database)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }

    /// Verify a candidate against this hash
    ///
    /// Returns `false` on mismatch and on a malformed digest. Argon2 compares
    /// in constant time.
    pub fn verify(&self, candidate: &ClearTextPassword, pepper: Option<&[u8]>) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(&self.hash) else {
            return false;
        };

        // Parameters are read from the PHC string.
        Argon2::default()
            .verify_password(&candidate.peppered(pepper), &parsed_hash)
            .is_ok()
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> PasswordHashParams {
        PasswordHashParams::minimal()
    }

    #[test]
    fn test_password_too_short() {
        let result = ClearTextPassword::new("Ab1".to_string());
        assert!(matches!(result, Err(PasswordPolicyError::TooShort { .. })));
    }

    #[test]
    fn test_long_password_accepted() {
        let long_password = format!("Aa1{}", "a".repeat(126));
        assert_eq!(long_password.chars().count(), 129);
        assert!(ClearTextPassword::new(long_password).is_ok());

        let very_long = format!("Zz9{}", "q".repeat(4096));
        assert!(validate_strength(&very_long).is_ok());
    }

    #[test]
    fn test_missing_character_classes() {
        for weak in ["alllowercase1", "ALLUPPERCASE1", "NoDigitsHere", "12345678"] {
            assert_eq!(
                validate_strength(weak),
                Err(PasswordPolicyError::MissingCharacterClass),
                "{weak}"
            );
        }
    }

    #[test]
    fn test_special_characters_not_required() {
        assert!(validate_strength("Secret123").is_ok());
        assert!(validate_strength("Password1").is_ok());
        assert!(validate_strength("MySecure#Pass2024!").is_ok());
    }

    #[test]
    fn test_whitespace_and_control_characters_allowed() {
        assert!(validate_strength("Passw0rd\tx").is_ok());
        assert!(validate_strength("Secret123\u{0007}").is_ok());
        assert!(validate_strength("Pass word 1").is_ok());
    }

    #[test]
    fn test_character_classes_are_ascii() {
        // No ASCII lowercase letter
        assert_eq!(
            validate_strength("PASSWORDé1"),
            Err(PasswordPolicyError::MissingCharacterClass)
        );
        // No ASCII uppercase letter
        assert_eq!(
            validate_strength("Ébcdefgh1"),
            Err(PasswordPolicyError::MissingCharacterClass)
        );
        assert!(validate_strength("Ébcdefgh1A").is_ok());
    }

    #[test]
    fn test_policy_message() {
        let err = validate_strength("weakpassword").unwrap_err();
        assert_eq!(
            err.to_string(),
            "password must include at least one uppercase letter, one lowercase letter, and one number"
        );
    }

    #[test]
    fn test_hash_and_verify() {
        let password = ClearTextPassword::new("TestPassword123".to_string()).unwrap();
        let hashed = password.hash(&fast(), None).unwrap();

        assert!(hashed.as_phc_string().starts_with("$argon2id$"));
        assert!(hashed.verify(&password, None));

        let wrong = ClearTextPassword::candidate("WrongPassword123".to_string());
        assert!(!hashed.verify(&wrong, None));
    }

    #[test]
    fn test_same_password_different_salts() {
        let password = ClearTextPassword::new("TestPassword123".to_string()).unwrap();
        let a = password.hash(&fast(), None).unwrap();
        let b = password.hash(&fast(), None).unwrap();
        assert_ne!(a.as_phc_string(), b.as_phc_string());
    }

    #[test]
    fn test_hash_with_pepper() {
        let password = ClearTextPassword::new("TestPassword123".to_string()).unwrap();
        let pepper = b"my_secret_pepper";
        let hashed = password.hash(&fast(), Some(pepper)).unwrap();

        assert!(hashed.verify(&password, Some(pepper)));
        assert!(!hashed.verify(&password, None));
        assert!(!hashed.verify(&password, Some(b"wrong_pepper")));
    }

    #[test]
    fn test_nfkc_equivalent_inputs_verify() {
        // U+FF21 FULLWIDTH A normalizes to "A"
        let ascii = ClearTextPassword::new("Apassword1".to_string()).unwrap();
        let fullwidth = ClearTextPassword::candidate("\u{FF21}password1".to_string());
        let hashed = ascii.hash(&fast(), None).unwrap();
        assert!(hashed.verify(&fullwidth, None));
    }

    #[test]
    fn test_verify_malformed_digest_is_false() {
        let digest = HashedPassword {
            hash: "not_a_valid_hash".to_string(),
        };
        let candidate = ClearTextPassword::candidate("Anything1".to_string());
        assert!(!digest.verify(&candidate, None));
        assert!(HashedPassword::from_phc_string("not_a_valid_hash").is_err());
    }

    #[test]
    fn test_phc_string_roundtrip() {
        let password = ClearTextPassword::new("TestPassword123".to_string()).unwrap();
        let hashed = password.hash(&fast(), None).unwrap();

        let restored = HashedPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(restored.verify(&password, None));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = PasswordHashParams {
            memory_kib: 1,
            iterations: 0,
            parallelism: 0,
        };
        let password = ClearTextPassword::new("TestPassword123".to_string()).unwrap();
        assert!(matches!(
            password.hash(&params, None),
            Err(PasswordHashError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_debug_redaction() {
        let password = ClearTextPassword::candidate("secret".to_string());
        let debug_output = format!("{:?}", password);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("secret"));
    }
}
