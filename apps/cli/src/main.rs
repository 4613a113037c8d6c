//! npbstats CLI: scrape NPB team batting and pitching tables into CSV
//! datasets.
//!
//! Walks the league index, each league's season listing and every team
//! page, then writes per-team, per-league and competition-wide files.

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
