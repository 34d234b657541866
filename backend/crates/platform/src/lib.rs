//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (HMAC-SHA256 signing, Base64url, randomness)
//! - Password policy and hashing (Argon2id)
//! - Bearer credential extraction
//! - Outbound mail transport

pub mod bearer;
pub mod crypto;
pub mod mail;
pub mod password;
