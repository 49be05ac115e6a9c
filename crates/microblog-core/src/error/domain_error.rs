//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{MicropostId, UserId};

/// Domain layer errors
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Micropost not found: {0}")]
    MicropostNotFound(MicropostId),

    #[error("Email address not found")]
    EmailNotFound,

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password too weak: {0}")]
    WeakPassword(String),

    #[error("Content can't be blank")]
    BlankContent,

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    #[error("Users cannot follow themselves")]
    CannotFollowSelf,

    // =========================================================================
    // Token Errors
    // =========================================================================
    #[error("Invalid activation link")]
    InvalidActivationLink,

    #[error("Invalid password reset link")]
    InvalidResetLink,

    #[error("Password reset has expired.")]
    PasswordResetExpired,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Account not activated. Check your email for the activation link.")]
    AccountNotActivated,

    #[error("Administrator privileges required")]
    NotAdmin,

    #[error("Not micropost author")]
    NotMicropostAuthor,

    #[error("Cannot modify another user's account")]
    NotAccountOwner,

    #[error("Administrators cannot delete their own account")]
    CannotDeleteSelf,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Email has already been taken")]
    EmailAlreadyExists,

    // =========================================================================
    // Infrastructure Errors
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Mail delivery error: {0}")]
    MailError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::MicropostNotFound(_) => "UNKNOWN_MICROPOST",
            Self::EmailNotFound => "EMAIL_NOT_FOUND",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::WeakPassword(_) => "WEAK_PASSWORD",
            Self::BlankContent => "BLANK_CONTENT",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::CannotFollowSelf => "CANNOT_FOLLOW_SELF",

            // Tokens
            Self::InvalidActivationLink => "INVALID_ACTIVATION_LINK",
            Self::InvalidResetLink => "INVALID_RESET_LINK",
            Self::PasswordResetExpired => "PASSWORD_RESET_EXPIRED",

            // Authorization
            Self::AccountNotActivated => "ACCOUNT_NOT_ACTIVATED",
            Self::NotAdmin => "NOT_ADMIN",
            Self::NotMicropostAuthor => "NOT_MICROPOST_AUTHOR",
            Self::NotAccountOwner => "NOT_ACCOUNT_OWNER",
            Self::CannotDeleteSelf => "CANNOT_DELETE_SELF",

            // Conflict
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::MailError(_) => "MAIL_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_) | Self::MicropostNotFound(_) | Self::EmailNotFound
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidEmail
                | Self::WeakPassword(_)
                | Self::BlankContent
                | Self::ContentTooLong { .. }
                | Self::CannotFollowSelf
        )
    }

    /// Check if an emailed link was rejected
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidActivationLink | Self::InvalidResetLink | Self::PasswordResetExpired
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::AccountNotActivated
                | Self::NotAdmin
                | Self::NotMicropostAuthor
                | Self::NotAccountOwner
                | Self::CannotDeleteSelf
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::EmailAlreadyExists)
    }
}
