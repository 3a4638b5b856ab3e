//! Scout CLI: DCGA market-intelligence reports from the terminal.
//!
//! Gathers news through a search provider, has the report model write the
//! briefing, and renders it to PDF. `scout serve` exposes the same pipeline
//! over HTTP.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
