//! Field rules shared by request DTOs and the domain
//!
//! The functions here plug into `validator`'s `custom` attribute so request
//! types report field-level errors with the same wording everywhere.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use validator::ValidationError;

pub const NAME_MAX_LENGTH: u64 = 50;
pub const EMAIL_MAX_LENGTH: u64 = 255;
pub const PASSWORD_MIN_LENGTH: u64 = 6;
pub const PASSWORD_MAX_LENGTH: u64 = 72;
pub const MICROPOST_MAX_LENGTH: usize = 140;

static VALID_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    // ASCII-only classes and case folding
    Regex::new(r"(?i-u)^[\w+\-.]+@[a-z\d\-]+(\.[a-z\d\-]+)*\.[a-z]+$")
        .unwrap_or_else(|e| unreachable!("email pattern is a literal: {e}"))
});

/// Whether `email` has an acceptable shape
pub fn is_valid_email(email: &str) -> bool {
    VALID_EMAIL.is_match(email.trim())
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Rejects empty and whitespace-only strings
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("blank", "can't be blank"));
    }
    Ok(())
}

pub fn email_format(value: &str) -> Result<(), ValidationError> {
    if !is_valid_email(value) {
        return Err(error("email", "is invalid"));
    }
    Ok(())
}
