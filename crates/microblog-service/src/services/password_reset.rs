//! Password reset service
//!
//! Reset links carry a token whose digest and issue time are stored on the
//! user. A link is honored only while both the token and the two hour window
//! check out.

use chrono::Utc;
use microblog_common::auth::{authenticated, hash_password, IssuedToken};
use microblog_core::entities::{normalize_email, TokenKind, User};
use microblog_core::DomainError;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{AuthResponse, MessageResponse, PasswordResetRequest, ResetPasswordRequest};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::session::SessionService;

pub const RESET_SENT_MESSAGE: &str = "Email sent with password reset instructions";
pub const RESET_DONE_MESSAGE: &str = "Password has been reset.";

/// Password reset service
pub struct PasswordResetService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PasswordResetService<'a> {
    /// Create a new PasswordResetService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Store a reset digest and mail the link
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn request_reset(&self, request: PasswordResetRequest) -> ServiceResult<MessageResponse> {
        request.validate()?;

        let email = normalize_email(&request.email);
        let mut user = self
            .ctx
            .user_repo()
            .find_by_email(&email)
            .await?
            .ok_or(DomainError::EmailNotFound)?;

        let issued = IssuedToken::generate()?;
        let sent_at = Utc::now();
        self.ctx
            .user_repo()
            .update_reset_digest(user.id, Some(&issued.digest), Some(sent_at))
            .await?;
        user.reset_digest = Some(issued.digest);
        user.reset_sent_at = Some(sent_at);

        info!(user_id = %user.id, "Password reset requested");

        if let Err(e) = self
            .ctx
            .mailer()
            .send_password_reset_email(&user, &issued.token)
            .await
        {
            warn!(user_id = %user.id, error = %e, "Password reset email not delivered");
        }

        Ok(MessageResponse::new(RESET_SENT_MESSAGE))
    }

    /// Check a reset link without consuming it
    #[instrument(skip(self, token), fields(email = %email))]
    pub async fn check_link(&self, token: &str, email: &str) -> ServiceResult<User> {
        let user = self
            .ctx
            .user_repo()
            .find_by_email(&normalize_email(email))
            .await?
            .filter(|user| user.is_activated() && authenticated(user, TokenKind::Reset, token))
            .ok_or_else(|| {
                warn!("Reset link rejected");
                DomainError::InvalidResetLink
            })?;

        if user.password_reset_expired() {
            warn!(user_id = %user.id, "Reset link expired");
            return Err(DomainError::PasswordResetExpired.into());
        }

        Ok(user)
    }

    /// Set a new password through a reset link. On success the user is
    /// logged in and the link stops working.
    #[instrument(skip(self, token, request), fields(email = %request.email))]
    pub async fn reset(&self, token: &str, request: ResetPasswordRequest) -> ServiceResult<AuthResponse> {
        let mut user = self.check_link(token, &request.email).await?;
        request.validate()?;

        let password_hash = hash_password(&request.password)?;
        self.ctx
            .user_repo()
            .update_password(user.id, &password_hash)
            .await?;
        self.ctx
            .user_repo()
            .update_reset_digest(user.id, None, None)
            .await?;
        user.reset_digest = None;
        user.reset_sent_at = None;

        info!(user_id = %user.id, "Password reset");

        Ok(SessionService::new(self.ctx)
            .issue(&user)?
            .with_message(RESET_DONE_MESSAGE))
    }
}
