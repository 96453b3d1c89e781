//! Command-line interface for strictly_games.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Games - Connect Four session server
#[derive(Parser, Debug)]
#[command(name = "strictly_games")]
#[command(about = "Two-player Connect Four server over WebSocket", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the game server
    Serve {
        /// Path to a TOML config file (defaults to ./strictly_games.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Port to bind to, overriding the config file
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to, overriding the config file
        #[arg(long)]
        host: Option<String>,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
