//! # microblog-service
//!
//! Application layer containing the account, session, follow-graph and feed
//! workflows together with their request and response DTOs.

pub mod dto;
pub mod services;

pub use services::{
    AccountService, FeedService, LoginOutcome, MicropostService, PasswordResetService,
    RelationshipService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
    SessionService, UserService,
};
