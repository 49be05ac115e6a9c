//! Route handlers
//!
//! All HTTP request handlers organized by resource.

pub mod accounts;
pub mod feed;
pub mod health;
pub mod microposts;
pub mod password_resets;
pub mod relationships;
pub mod sessions;
pub mod users;
