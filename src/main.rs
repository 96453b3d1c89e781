//! Strictly Games - Connect Four server CLI
//!
//! Serves a two-player Connect Four room over WebSocket.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use std::path::PathBuf;
use strictly_games::{ServerConfig, server};
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config, port, host } => run_server(config, host, port).await,
        Command::Config { config } => print_config(config),
    }
}

/// Run the WebSocket game server
async fn run_server(config: Option<PathBuf>, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = ServerConfig::load(config.as_deref())?;
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    serve(config).await
}

#[instrument(skip_all, fields(address = %config.bind_address()))]
async fn serve(config: ServerConfig) -> Result<()> {
    info!("Starting Strictly Games Connect Four server");

    let handle = server::start(&config).await?;
    info!(addr = %handle.addr, "Server ready at ws://{}/ws", handle.addr);

    handle.wait().await?;
    info!("Server exited");
    Ok(())
}

/// Print the effective configuration
fn print_config(config: Option<PathBuf>) -> Result<()> {
    let config = ServerConfig::load(config.as_deref())?;
    print!("{}", config.to_toml()?);
    Ok(())
}
