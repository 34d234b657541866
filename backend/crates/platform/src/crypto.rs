//! Cryptographic Utilities

use std::fmt;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Minimum accepted length of a signing secret, in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Encode bytes as unpadded base64url
pub fn to_base64url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode unpadded base64url to bytes
pub fn from_base64url(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(s)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Signing secret must be at least {min} bytes (got {actual})")]
pub struct SecretTooShort {
    pub min: usize,
    pub actual: usize,
}

/// HMAC-SHA256 key, keyed once at startup
///
/// The prepared MAC state is cloned per operation.
#[derive(Clone)]
pub struct SigningKey {
    mac: HmacSha256,
}

impl SigningKey {
    pub fn new(secret: &[u8]) -> Result<Self, SecretTooShort> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(SecretTooShort {
                min: MIN_SECRET_LEN,
                actual: secret.len(),
            });
        }
        // HMAC accepts keys of any length; the length check above is ours.
        let mac = <HmacSha256 as Mac>::new_from_slice(secret).map_err(|_| SecretTooShort {
            min: MIN_SECRET_LEN,
            actual: secret.len(),
        })?;
        Ok(Self { mac })
    }

    /// Compute HMAC-SHA256 over `data`
    pub fn sign(&self, data: &[u8]) -> [u8; 32] {
        let mut mac = self.mac.clone();
        mac.update(data);
        mac.finalize().into_bytes().into()
    }

    /// Constant-time check of `signature` over `data`
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        let mut mac = self.mac.clone();
        mac.update(data);
        mac.verify_slice(signature).is_ok()
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey").field("key", &"[REDACTED]").finish()
    }
}
