//! # kubegraph CLI
//!
//! Binary entry point. Parses arguments, sets up logging and runs the chosen
//! command; the work itself lives in the library crate.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
