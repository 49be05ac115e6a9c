//! Ports implemented by the infrastructure crates

mod mailer;
mod repositories;

pub use mailer::Mailer;
pub use repositories::{
    MicropostRepository, PageQuery, RelationshipRepository, RepoResult, UserRepository,
};
