use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "edgeprobe",
    about = "Validation harness for Experience Edge event collection and identity",
    version
)]
pub struct Cli {
    /// Path to an alternate config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the collect endpoint base url
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum Command {
    /// Submit a basic validation event and print the outcome
    Basic,
    /// Submit a commerce product-view event with dummy product data
    Data,
    /// Fetch the client identifier (ECID)
    Identity,
    /// Print the startup readiness state and exit
    Status,
}
