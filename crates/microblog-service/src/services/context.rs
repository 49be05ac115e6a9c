//! Service context - dependency container for services
//!
//! Holds the repositories, the mailer and the session token issuer.

use std::sync::Arc;

use microblog_common::auth::JwtService;
use microblog_core::entities::User;
use microblog_core::traits::{
    Mailer, MicropostRepository, RelationshipRepository, UserRepository,
};
use microblog_core::{DomainError, UserId};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// Every service borrows it. The repositories and mailer are trait objects so
/// the same services run over PostgreSQL in production and an in-memory
/// store in tests.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    user_repo: Arc<dyn UserRepository>,
    micropost_repo: Arc<dyn MicropostRepository>,
    relationship_repo: Arc<dyn RelationshipRepository>,

    // Collaborators
    mailer: Arc<dyn Mailer>,
    jwt_service: Arc<JwtService>,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        micropost_repo: Arc<dyn MicropostRepository>,
        relationship_repo: Arc<dyn RelationshipRepository>,
        mailer: Arc<dyn Mailer>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            user_repo,
            micropost_repo,
            relationship_repo,
            mailer,
            jwt_service,
        }
    }

    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the micropost repository
    pub fn micropost_repo(&self) -> &dyn MicropostRepository {
        self.micropost_repo.as_ref()
    }

    /// Get the relationship repository
    pub fn relationship_repo(&self) -> &dyn RelationshipRepository {
        self.relationship_repo.as_ref()
    }

    // === Collaborators ===

    /// Get the account mailer
    pub fn mailer(&self) -> &dyn Mailer {
        self.mailer.as_ref()
    }

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    /// Load a user or fail with `UserNotFound`
    pub async fn require_user(&self, id: UserId) -> ServiceResult<User> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::Domain(DomainError::UserNotFound(id)))
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("mailer", &"dyn Mailer")
            .finish_non_exhaustive()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    micropost_repo: Option<Arc<dyn MicropostRepository>>,
    relationship_repo: Option<Arc<dyn RelationshipRepository>>,
    mailer: Option<Arc<dyn Mailer>>,
    jwt_service: Option<Arc<JwtService>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn micropost_repo(mut self, repo: Arc<dyn MicropostRepository>) -> Self {
        self.micropost_repo = Some(repo);
        self
    }

    pub fn relationship_repo(mut self, repo: Arc<dyn RelationshipRepository>) -> Self {
        self.relationship_repo = Some(repo);
        self
    }

    pub fn mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.user_repo
                .ok_or_else(|| ServiceError::validation("user_repo is required"))?,
            self.micropost_repo
                .ok_or_else(|| ServiceError::validation("micropost_repo is required"))?,
            self.relationship_repo
                .ok_or_else(|| ServiceError::validation("relationship_repo is required"))?,
            self.mailer
                .ok_or_else(|| ServiceError::validation("mailer is required"))?,
            self.jwt_service
                .ok_or_else(|| ServiceError::validation("jwt_service is required"))?,
        ))
    }
}
