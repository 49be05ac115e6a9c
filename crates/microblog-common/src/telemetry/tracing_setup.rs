//! Tracing subscriber setup
//!
//! `RUST_LOG` wins when set. Otherwise the microblog crates log at the
//! configured level while sqlx, lettre and hyper are kept at `warn`.

use tracing::{Level, Subscriber};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    Layer,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::Environment;

/// Crates whose own logs are too chatty below `warn`
const QUIET_CRATES: &[&str] = &["sqlx", "lettre", "hyper", "h2", "rustls"];

/// How events are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, colored, for a terminal
    Pretty,
    /// Single-line, for test output
    Compact,
    /// One JSON object per event
    Json,
}

/// Subscriber settings
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level for our crates and `tower_http` when `RUST_LOG` is unset
    pub level: Level,
    pub format: LogFormat,
    /// Log span open/close, which times every service call
    pub span_events: bool,
    pub file_line: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::for_environment(Environment::Test)
    }
}

impl TracingConfig {
    /// Pick the preset matching the deployment environment
    #[must_use]
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self {
                level: Level::DEBUG,
                format: LogFormat::Pretty,
                span_events: true,
                file_line: true,
            },
            Environment::Test => Self {
                level: Level::INFO,
                format: LogFormat::Compact,
                span_events: false,
                file_line: true,
            },
            Environment::Production => Self {
                level: Level::INFO,
                format: LogFormat::Json,
                span_events: false,
                file_line: false,
            },
        }
    }

    /// Filter used when `RUST_LOG` is absent
    pub fn default_directives(&self) -> String {
        let level = self.level.as_str().to_ascii_lowercase();
        let mut directives = vec![level.clone(), format!("tower_http={level}")];
        directives.extend(QUIET_CRATES.iter().map(|name| format!("{name}=warn")));
        directives.join(",")
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// Install the global subscriber with the default configuration
pub fn init_tracing() -> Result<(), TracingError> {
    init_tracing_with_config(&TracingConfig::default())
}

/// Install the global subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init_tracing_with_config(config: &TracingConfig) -> Result<(), TracingError> {
    build_subscriber(config)?
        .try_init()
        .map_err(|_| TracingError::AlreadyInitialized)
}

fn build_subscriber(config: &TracingConfig) -> Result<impl Subscriber + Send + Sync + 'static, TracingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.default_directives())
            .map_err(|e| TracingError::InvalidFilter(e.to_string()))?,
    };

    let layer = match config.format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_file(config.file_line)
            .with_line_number(config.file_line)
            .with_span_events(config.span_events())
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_file(config.file_line)
            .with_line_number(config.file_line)
            .with_span_events(config.span_events())
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_file(config.file_line)
            .with_line_number(config.file_line)
            .with_span_events(config.span_events())
            .boxed(),
    };

    Ok(tracing_subscriber::registry().with(layer).with(filter))
}

/// Tracing initialization errors
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,

    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),
}
