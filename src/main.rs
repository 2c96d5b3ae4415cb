use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use edgeprobe::app;
use edgeprobe::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Keep stdout for the status/identity/log surfaces; diagnostics go to
    // stderr.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();
    app::run(cli).await
}
