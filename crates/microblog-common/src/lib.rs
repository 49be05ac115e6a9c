//! # microblog-common
//!
//! Shared utilities including configuration, error handling, authentication,
//! account mail and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod mail;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{
    authenticate_password, authenticated, generate_token, hash_password, verify_digest,
    verify_password, Claims, IssuedToken, JwtService, SessionToken,
};
pub use config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig, Environment, JwtConfig,
    MailBackend, MailConfig, RateLimitConfig, ServerConfig, SmtpConfig,
};
pub use error::AppError;
pub use mail::{mailer_from_config, AccountMailer, MailComposer, MailKind, MailMessage, MemoryTransport};
pub use telemetry::{
    init_tracing, init_tracing_with_config, LogFormat, TracingConfig, TracingError,
};
