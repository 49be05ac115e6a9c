//! Random tokens and their stored digests
//!
//! Remember-me, activation and reset tokens share one scheme: 16 random
//! bytes, URL-safe base64, handed to the client once. Only an argon2 digest
//! of the token is persisted.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use microblog_core::{TokenKind, User};
use rand::{rngs::OsRng, RngCore};

use super::password::{hash_password, verify_password};
use crate::error::AppError;

/// Entropy per token, in bytes
pub const TOKEN_BYTES: usize = 16;

/// Generate a URL-safe random token
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// One-way digest of a token, suitable for storage
///
/// # Errors
/// Returns an error if hashing fails
pub fn digest(token: &str) -> Result<String, AppError> {
    hash_password(token)
}

/// Check a presented token against a stored digest.
///
/// A digest that fails to parse never matches.
pub fn verify_digest(token: &str, digest: &str) -> bool {
    verify_password(token, digest).unwrap_or(false)
}

/// Whether `token` matches the digest `user` holds for `kind`.
///
/// Returns false when no digest of that kind has been generated.
pub fn authenticated(user: &User, kind: TokenKind, token: &str) -> bool {
    match user.digest(kind) {
        Some(stored) => verify_digest(token, stored),
        None => false,
    }
}

/// A fresh token together with the digest to store for it
#[derive(Clone)]
pub struct IssuedToken {
    pub token: String,
    pub digest: String,
}

impl IssuedToken {
    /// Generate a token and digest it
    ///
    /// # Errors
    /// Returns an error if hashing fails
    pub fn generate() -> Result<Self, AppError> {
        let token = generate_token();
        let digest = digest(&token)?;
        Ok(Self { token, digest })
    }
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken").finish_non_exhaustive()
    }
}
