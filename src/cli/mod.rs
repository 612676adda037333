//! CLI module for keygate
//!
//! Provides subcommands:
//! - `serve`: run the HTTP API server
//! - `keys`: manage API keys against the configured store

pub mod keys;
pub mod serve;

use clap::{Parser, Subcommand};

/// keygate - API key issuance and verification service
#[derive(Parser)]
#[command(name = "keygate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Manage API keys
    #[command(subcommand)]
    Keys(keys::KeysCommand),
}
