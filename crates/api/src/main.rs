//! MedMinder - medication reminder engine
//!
//! Main entry point for the headless reminder service.

use anyhow::Context;
use medminder_domain::UserId;
use medminder_lib::utils::logging::init_tracing;
use medminder_lib::AppContext;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env before reading configuration
    let dotenv = dotenvy::dotenv();

    let config = medminder_infra::config::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(e) => warn!(error = %e, "Could not load .env file"),
    }

    info!("MedMinder starting...");
    let ctx = AppContext::new(config).context("failed to initialise application context")?;

    let user_id = UserId::new(std::env::var("MEDMINDER_USER").unwrap_or_else(|_| "local".into()));
    let scheduled = ctx.watch_user(&user_id).await.context("failed to load medications")?;
    info!(user = %user_id, scheduled, "Watching user");

    ctx.start_reminders().await.context("failed to start reminder scheduler")?;
    info!("MedMinder initialized successfully");

    tokio::signal::ctrl_c().await.context("failed to listen for shutdown signal")?;
    info!("Shutdown requested");
    ctx.shutdown().await.context("failed to stop reminder scheduler")?;
    Ok(())
}
