//! Authentication utilities

mod jwt;
mod password;
mod token;

pub use jwt::{Claims, JwtService, SessionToken};
pub use password::{authenticate_password, hash_password, verify_password};
pub use token::{authenticated, digest, generate_token, verify_digest, IssuedToken, TOKEN_BYTES};
