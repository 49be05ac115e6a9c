//! User entity - an account that can post, follow and be followed

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

use crate::value_objects::UserId;

/// A password reset link stops working this many hours after it was issued
pub const PASSWORD_RESET_WINDOW_HOURS: i64 = 2;

/// The three purposes a random token can be issued for.
///
/// Each kind has its own digest column, so a token minted for one purpose
/// never authenticates for another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Remember,
    Activation,
    Reset,
}

impl TokenKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Remember => "remember",
            Self::Activation => "activation",
            Self::Reset => "reset",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User account.
///
/// The password digest is not part of the entity. Repositories expose it
/// through dedicated methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub admin: bool,
    pub activated: bool,
    pub activated_at: Option<DateTime<Utc>>,
    pub activation_digest: Option<String>,
    pub remember_digest: Option<String>,
    pub reset_digest: Option<String>,
    pub reset_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create an unactivated, non-admin user
    pub fn new(id: UserId, name: String, email: &str) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            email: normalize_email(email),
            admin: false,
            activated: false,
            activated_at: None,
            activation_digest: None,
            remember_digest: None,
            reset_digest: None,
            reset_sent_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Stored digest for the given token kind, if one was ever generated
    pub fn digest(&self, kind: TokenKind) -> Option<&str> {
        match kind {
            TokenKind::Remember => self.remember_digest.as_deref(),
            TokenKind::Activation => self.activation_digest.as_deref(),
            TokenKind::Reset => self.reset_digest.as_deref(),
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.admin
    }

    #[inline]
    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// Mark the account as activated at `at`.
    ///
    /// The activation digest is left in place.
    pub fn activate(&mut self, at: DateTime<Utc>) {
        self.activated = true;
        self.activated_at = Some(at);
        self.updated_at = at;
    }

    /// Whether a reset issued at `reset_sent_at` is stale as of `now`.
    ///
    /// A user with no outstanding reset is treated as expired.
    pub fn password_reset_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.reset_sent_at {
            Some(sent_at) => now - sent_at > Duration::hours(PASSWORD_RESET_WINDOW_HOURS),
            None => true,
        }
    }

    pub fn password_reset_expired(&self) -> bool {
        self.password_reset_expired_at(Utc::now())
    }

    /// Gravatar image URL for this user's email
    pub fn gravatar_url(&self, size: u32) -> String {
        let hash = Sha256::digest(self.email.trim().to_lowercase().as_bytes());
        format!("https://secure.gravatar.com/avatar/{hash:x}?s={size}")
    }

    pub fn set_name(&mut self, name: String) {
        self.name = name.trim().to_string();
        self.updated_at = Utc::now();
    }

    /// Update the email, stored in its canonical lowercase form
    pub fn set_email(&mut self, email: &str) {
        self.email = normalize_email(email);
        self.updated_at = Utc::now();
    }
}

/// Canonical form used for storage and lookups
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Fields needed to insert a user row; the id is assigned by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub admin: bool,
    pub activation_digest: Option<String>,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: &str) -> Self {
        Self {
            name: name.into().trim().to_string(),
            email: normalize_email(email),
            admin: false,
            activation_digest: None,
        }
    }

    pub fn with_activation_digest(mut self, digest: String) -> Self {
        self.activation_digest = Some(digest);
        self
    }

    pub fn with_admin(mut self, admin: bool) -> Self {
        self.admin = admin;
        self
    }
}
