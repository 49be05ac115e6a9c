//! Business logic services
//!
//! Each service borrows the `ServiceContext` and covers one workflow. The
//! acting user is always passed in explicitly.

pub mod account;
pub mod context;
pub mod error;
pub mod feed;
pub mod micropost;
pub mod password_reset;
pub mod relationship;
pub mod session;
pub mod user;

pub use account::AccountService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use feed::FeedService;
pub use micropost::MicropostService;
pub use password_reset::PasswordResetService;
pub use relationship::RelationshipService;
pub use session::{LoginOutcome, SessionService};
pub use user::UserService;
