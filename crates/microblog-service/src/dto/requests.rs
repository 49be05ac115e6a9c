//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize`, and the ones carrying user input
//! implement `Validate` so failures come back per field.

use microblog_core::validation::{email_format, not_blank};
use microblog_core::UserId;
use std::borrow::Cow;

use serde::Deserialize;
use validator::{Validate, ValidationError};

// ============================================================================
// Account Requests
// ============================================================================

/// Signup form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "is too long (maximum is 50 characters)")
    )]
    pub name: String,

    #[validate(
        length(max = 255, message = "is too long (maximum is 255 characters)"),
        custom(function = "email_format")
    )]
    pub email: String,

    #[validate(
        custom(function = "not_blank"),
        length(min = 6, max = 72, message = "must be 6-72 characters"),
        must_match(other = "password_confirmation", message = "doesn't match confirmation")
    )]
    pub password: String,

    pub password_confirmation: String,
}

/// Login form
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,

    pub password: String,

    /// Keep a remember-me cookie after the browser closes
    #[serde(default)]
    pub remember_me: bool,
}

/// Ask for a password reset email
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(custom(function = "not_blank"))]
    pub email: String,
}

/// Submit a new password through a reset link
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    pub email: String,

    #[validate(
        custom(function = "not_blank"),
        length(min = 6, max = 72, message = "must be 6-72 characters"),
        must_match(other = "password_confirmation", message = "doesn't match confirmation")
    )]
    pub password: String,

    pub password_confirmation: String,
}

/// `?email=` on activation and reset links
#[derive(Debug, Clone, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

// ============================================================================
// User Requests
// ============================================================================

/// Profile edit. Omitted fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "password_confirmed", skip_on_field_errors = false))]
pub struct UpdateUserRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "is too long (maximum is 50 characters)")
    )]
    pub name: Option<String>,

    #[validate(
        length(max = 255, message = "is too long (maximum is 255 characters)"),
        custom(function = "email_format")
    )]
    pub email: Option<String>,

    #[validate(
        custom(function = "not_blank"),
        length(min = 6, max = 72, message = "must be 6-72 characters")
    )]
    pub password: Option<String>,

    pub password_confirmation: Option<String>,
}

/// A new password and its confirmation come together and agree
fn password_confirmed(request: &UpdateUserRequest) -> Result<(), ValidationError> {
    match (&request.password, &request.password_confirmation) {
        (None, None) => Ok(()),
        (Some(password), Some(confirmation)) if password == confirmation => Ok(()),
        (None, Some(_)) => {
            let mut err = ValidationError::new("password_missing");
            err.message = Some(Cow::Borrowed("confirmation given without a password"));
            Err(err)
        }
        _ => {
            let mut err = ValidationError::new("must_match");
            err.message = Some(Cow::Borrowed("password doesn't match confirmation"));
            Err(err)
        }
    }
}

// ============================================================================
// Micropost Requests
// ============================================================================

/// Create micropost request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMicropostRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 140, message = "is too long (maximum is 140 characters)")
    )]
    pub content: String,
}

// ============================================================================
// Relationship Requests
// ============================================================================

/// Follow request
#[derive(Debug, Clone, Deserialize)]
pub struct FollowRequest {
    #[serde(default)]
    pub followed_id: Option<UserId>,
}
