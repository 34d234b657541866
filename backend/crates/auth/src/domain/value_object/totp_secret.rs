//! TOTP Secret Value Object
//!
//! Base32 secret for authenticator apps (RFC 6238, SHA1, 6 digits, 30s).

use kernel::error::app_error::{AppError, AppResult};
use totp_rs::{Algorithm, Secret, TOTP};

const TOTP_DIGITS: usize = 6;
const TOTP_STEP: u64 = 30;
const TOTP_ISSUER: &str = "MindDrift";

#[derive(Clone, PartialEq, Eq)]
pub struct TotpSecret {
    secret_base32: String,
}

impl TotpSecret {
    /// Generate a new random 160-bit secret
    pub fn generate() -> Self {
        Self {
            secret_base32: Secret::generate_secret().to_encoded().to_string(),
        }
    }

    /// Accept a caller-supplied or stored secret
    ///
    /// Must be valid Base32 and at least 128 bits.
    pub fn from_base32(secret: impl AsRef<str>) -> AppResult<Self> {
        let secret_base32 = secret.as_ref().trim().to_ascii_uppercase();
        let candidate = Self { secret_base32 };
        candidate.to_totp("validation")?;
        Ok(candidate)
    }

    pub fn as_base32(&self) -> &str {
        &self.secret_base32
    }

    fn to_totp(&self, account_name: &str) -> AppResult<TOTP> {
        let bytes = Secret::Encoded(self.secret_base32.clone())
            .to_bytes()
            .map_err(|_| AppError::bad_request("TOTP secret must be valid Base32"))?;

        TOTP::new(
            Algorithm::SHA1,
            TOTP_DIGITS,
            1,
            TOTP_STEP,
            bytes,
            Some(TOTP_ISSUER.to_string()),
            account_name.to_string(),
        )
        .map_err(|e| AppError::bad_request(format!("Invalid TOTP secret: {e}")))
    }

    /// `otpauth://` URI for authenticator enrollment
    pub fn otpauth_url(&self, account_name: &str) -> AppResult<String> {
        Ok(self.to_totp(account_name)?.get_url())
    }
}

impl std::fmt::Debug for TotpSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TotpSecret")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_valid_base32() {
        let secret = TotpSecret::generate();
        assert!(TotpSecret::from_base32(secret.as_base32()).is_ok());
    }

    #[test]
    fn test_from_base32_rejects_garbage_and_short() {
        assert!(TotpSecret::from_base32("not base32 !!").is_err());
        // 8 bytes of entropy, below the 128-bit floor
        assert!(TotpSecret::from_base32("JBSWY3DPEHPK3PXP").is_err());
    }

    #[test]
    fn test_from_base32_normalizes_case() {
        let secret = TotpSecret::from_base32("jbswy3dpehpk3pxpjbswy3dpehpk3pxp").unwrap();
        assert_eq!(secret.as_base32(), "JBSWY3DPEHPK3PXPJBSWY3DPEHPK3PXP");
    }

    #[test]
    fn test_otpauth_url() {
        let secret = TotpSecret::generate();
        let url = secret.otpauth_url("alice@x.io").unwrap();
        assert!(url.starts_with("otpauth://totp/"));
        assert!(url.contains(secret.as_base32()));
    }

    #[test]
    fn test_debug_redacted() {
        let secret = TotpSecret::generate();
        assert!(!format!("{:?}", secret).contains(secret.as_base32()));
    }
}
