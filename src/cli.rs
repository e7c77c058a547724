//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// kubegraph - Apply cross-referencing rules to Kubernetes manifests
#[derive(Parser, Debug)]
#[command(name = "kubegraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply a rule file to the input manifests and print the result
    Build(commands::build::BuildArgs),

    /// Check a rule file and the templates it references
    Validate(commands::validate::ValidateArgs),

    /// Resolve a selector against the input manifests
    Query(commands::query::QueryArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match self.command {
            Commands::Build(args) => commands::build::execute(args),
            Commands::Validate(args) => commands::validate::execute(args, &self.color),
            Commands::Query(args) => commands::query::execute(args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Log to stderr so stdout carries only documents.
fn init_logging(level: &str) {
    let _ = env_logger::Builder::new()
        .parse_filters(level)
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .try_init();
}
