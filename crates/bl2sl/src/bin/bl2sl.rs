//! Backlog to Slack bridge binary.
//!
//! Standalone HTTP service receiving Backlog webhooks.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bl2sl::{config::Config, server};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("bl2sl=info".parse()?))
        .init();

    info!("Starting bl2sl bridge...");

    let config = Config::default();

    // Requests still fail per call when these are missing
    for name in config.missing_required() {
        warn!(variable = name, "Required environment variable is not set");
    }

    let state = server::AppState::from_config(&config).context("Failed to build API clients")?;
    let app = server::build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(port = config.port, "bl2sl listening");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
