//! Microblog API Server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p microblog-api
//! ```
//!
//! Configuration is loaded from environment variables or a `.env` file.

use microblog_common::{init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Server failed to start");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    if let Err(e) = init_tracing_with_config(&TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        address = %config.api.address(),
        mail = ?config.mail.backend,
        "Starting Microblog API Server"
    );

    microblog_api::run(config).await?;

    Ok(())
}
