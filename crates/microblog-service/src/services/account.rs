//! Account service
//!
//! Signup and account activation.

use chrono::Utc;
use microblog_common::auth::{authenticated, hash_password, IssuedToken};
use microblog_core::entities::{normalize_email, NewUser, TokenKind};
use microblog_core::DomainError;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{AuthResponse, CurrentUserResponse, SignupRequest, SignupResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::session::SessionService;

pub const SIGNUP_MESSAGE: &str = "Please check your email to activate your account.";
pub const ACTIVATED_MESSAGE: &str = "Account activated!";

/// Account service
pub struct AccountService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AccountService<'a> {
    /// Create a new AccountService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create an unactivated account and mail its activation link
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn signup(&self, request: SignupRequest) -> ServiceResult<SignupResponse> {
        request.validate()?;

        let email = normalize_email(&request.email);
        if self.ctx.user_repo().email_exists(&email, None).await? {
            return Err(DomainError::EmailAlreadyExists.into());
        }

        let password_hash = hash_password(&request.password)?;
        let activation = IssuedToken::generate()?;

        let new_user = NewUser::new(request.name, &email).with_activation_digest(activation.digest);
        let user = self.ctx.user_repo().create(&new_user, &password_hash).await?;

        info!(user_id = %user.id, "User signed up");

        if let Err(e) = self
            .ctx
            .mailer()
            .send_activation_email(&user, &activation.token)
            .await
        {
            warn!(user_id = %user.id, error = %e, "Activation email not delivered");
        }

        Ok(SignupResponse {
            message: SIGNUP_MESSAGE.to_string(),
            user: CurrentUserResponse::from(&user),
        })
    }

    /// Follow an activation link. On success the user is logged in.
    #[instrument(skip(self, token), fields(email = %email))]
    pub async fn activate(&self, token: &str, email: &str) -> ServiceResult<AuthResponse> {
        let email = normalize_email(email);
        let mut user = self
            .ctx
            .user_repo()
            .find_by_email(&email)
            .await?
            .filter(|user| {
                !user.is_activated() && authenticated(user, TokenKind::Activation, token)
            })
            .ok_or_else(|| {
                warn!("Activation rejected");
                DomainError::InvalidActivationLink
            })?;

        let now = Utc::now();
        self.ctx.user_repo().activate(user.id, now).await?;
        user.activate(now);

        info!(user_id = %user.id, "Account activated");

        Ok(SessionService::new(self.ctx)
            .issue(&user)?
            .with_message(ACTIVATED_MESSAGE))
    }
}
