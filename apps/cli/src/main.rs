//! ArticleForge CLI — single-shot article enrichment tool.
//!
//! Selects one original article from the storage backlog, enriches it
//! with independently sourced reference material, and persists a
//! rewritten, citation-bearing article alongside the original.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
