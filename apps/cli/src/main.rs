//! SourceBrief CLI — web-sourced question answering from the terminal.
//!
//! Searches the web for a question, condenses paragraph text from the top
//! sources into a short answer, and cites every source it considered.

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
