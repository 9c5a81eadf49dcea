use anyhow::Result;
use clap::Parser;

use dmitry::{cli::Cli, runtime::Orchestrator};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Create and run the orchestrator
    let orchestrator = Orchestrator::new(cli)?;
    orchestrator.run().await
}
