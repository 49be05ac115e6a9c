//! Session service
//!
//! Login, logout and remember-me. A session is a short-lived JWT; the
//! remember-me token is a long-lived secret whose digest sits on the user.

use microblog_common::auth::{authenticate_password, authenticated, IssuedToken};
use microblog_common::AppError;
use microblog_core::entities::{normalize_email, TokenKind, User};
use microblog_core::{DomainError, UserId};
use tracing::{info, instrument, warn};

use crate::dto::{AuthResponse, CurrentUserResponse, LoginRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// What a successful login hands back to the HTTP layer
#[derive(Debug)]
pub struct LoginOutcome {
    pub auth: AuthResponse,
    /// Set when the client asked to be remembered
    pub remember_token: Option<String>,
}

impl LoginOutcome {
    pub fn user_id(&self) -> UserId {
        self.auth.user.id
    }
}

/// Session service
pub struct SessionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SessionService<'a> {
    /// Create a new SessionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Log in with email and password
    #[instrument(skip(self, request), fields(email = %request.email, remember_me = request.remember_me))]
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<LoginOutcome> {
        let email = normalize_email(&request.email);
        let user = self
            .ctx
            .user_repo()
            .find_by_email(&email)
            .await?
            .ok_or_else(|| {
                warn!("Login failed: user not found");
                ServiceError::App(AppError::InvalidCredentials)
            })?;

        let password_hash = self
            .ctx
            .user_repo()
            .get_password_hash(user.id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %user.id, "Login failed: no password hash");
                ServiceError::App(AppError::InvalidCredentials)
            })?;

        if let Err(e) = authenticate_password(&request.password, &password_hash) {
            warn!(user_id = %user.id, "Login failed: invalid password");
            return Err(e.into());
        }

        if !user.is_activated() {
            warn!(user_id = %user.id, "Login refused: account not activated");
            return Err(DomainError::AccountNotActivated.into());
        }

        let remember_token = if request.remember_me {
            Some(self.remember(user.id).await?)
        } else {
            self.forget(user.id).await?;
            None
        };

        info!(user_id = %user.id, "User logged in successfully");

        Ok(LoginOutcome {
            auth: self.issue(&user)?,
            remember_token,
        })
    }

    /// Store a fresh remember digest and return the plaintext token
    #[instrument(skip(self))]
    pub async fn remember(&self, user_id: UserId) -> ServiceResult<String> {
        let issued = IssuedToken::generate()?;
        self.ctx
            .user_repo()
            .update_remember_digest(user_id, Some(&issued.digest))
            .await?;
        Ok(issued.token)
    }

    /// Clear the remember digest
    #[instrument(skip(self))]
    pub async fn forget(&self, user_id: UserId) -> ServiceResult<()> {
        self.ctx
            .user_repo()
            .update_remember_digest(user_id, None)
            .await?;
        Ok(())
    }

    /// Log out: the remember-me token stops working
    #[instrument(skip(self))]
    pub async fn logout(&self, user_id: UserId) -> ServiceResult<()> {
        self.forget(user_id).await?;
        info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    /// Start a new session from remember-me cookies
    #[instrument(skip(self, remember_token))]
    pub async fn restore(&self, user_id: UserId, remember_token: &str) -> ServiceResult<AuthResponse> {
        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .filter(|user| authenticated(user, TokenKind::Remember, remember_token))
            .ok_or_else(|| {
                warn!(user_id = %user_id, "Remembered session rejected");
                ServiceError::App(AppError::InvalidToken)
            })?;

        info!(user_id = %user.id, "Session restored from remember token");
        self.issue(&user)
    }

    /// Resolve an access token to its user
    #[instrument(skip(self, access_token))]
    pub async fn current_user(&self, access_token: &str) -> ServiceResult<User> {
        let user_id = self.ctx.jwt_service().authenticate(access_token)?;
        self.ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(ServiceError::App(AppError::InvalidToken))
    }

    /// Issue a session token for `user`
    pub fn issue(&self, user: &User) -> ServiceResult<AuthResponse> {
        let session = self.ctx.jwt_service().issue(user.id)?;
        Ok(AuthResponse::new(
            session.access_token,
            session.expires_in,
            CurrentUserResponse::from(user),
        ))
    }
}
