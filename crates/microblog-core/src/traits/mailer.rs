//! Outbound mail port
//!
//! The services hand over the recipient and the plaintext token; rendering
//! the link and delivering the message is the implementation's business.

use async_trait::async_trait;

use crate::entities::User;
use crate::traits::RepoResult;

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send the link that activates a freshly registered account
    async fn send_activation_email(&self, user: &User, token: &str) -> RepoResult<()>;

    /// Send the link that authorizes a password change
    async fn send_password_reset_email(&self, user: &User, token: &str) -> RepoResult<()>;
}
