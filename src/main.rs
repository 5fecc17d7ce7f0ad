//! TagBridge - Main Entry Point
//!
//! Usage: `tagbridge-rs [CONFIG_FILE]`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tagbridge_rs::{
    backend::SimulatedAddressSpace,
    config::AppConfig,
    http::{self, AppState},
    logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::resolve(std::env::args_os().nth(1).map(PathBuf::from))
        .context("Failed to load configuration")?;

    // Keep the guard alive so the file writer flushes on exit
    let _log_guard = logging::init(&config.logging)?;

    tracing::info!("Starting TagBridge {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Channel of interest: {}", config.server.channel);

    if let Some(sim) = &config.simulation {
        let space = SimulatedAddressSpace::load(&sim.file)?;
        let state = AppState::new(Arc::new(space), config.server.channel.clone());
        http::serve(state, config.http.bind).await?;
        return Ok(());
    }

    run_live(&config).await
}

#[cfg(feature = "opcua-client")]
async fn run_live(config: &AppConfig) -> anyhow::Result<()> {
    use tagbridge_rs::backend::OpcUaClient;

    tracing::info!("Using OPC UA endpoint {}", config.server.endpoint);
    let client = OpcUaClient::new(&config.server)?;
    let state = AppState::new(Arc::new(client), config.server.channel.clone());
    http::serve(state, config.http.bind).await?;
    Ok(())
}

#[cfg(not(feature = "opcua-client"))]
async fn run_live(_config: &AppConfig) -> anyhow::Result<()> {
    anyhow::bail!(
        "no [simulation] file configured and this build lacks the `opcua-client` feature"
    )
}
