//! Build command implementation
//!
//! Reads the input manifests, applies the rule file and writes the resulting
//! document stream to stdout or to `--output`.

use anyhow::{Context, Result};
use clap::Args;
use std::io::Write;
use std::path::PathBuf;

use kubegraph::engine::DEFAULT_DOCUMENT_LIMIT;
use kubegraph::input;
use kubegraph::orchestrator::{self, RunConfig};

/// Arguments for the build command
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Rule file; templates are resolved relative to its directory
    #[arg(short, long, value_name = "PATH", env = "KUBEGRAPH_RULES")]
    pub rules: PathBuf,

    /// Manifest file or directory (defaults to stdin, then the current directory)
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Values file (defaults to values.yaml beside the rule file)
    #[arg(long, value_name = "PATH")]
    pub values: Option<PathBuf>,

    /// Write output here instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Fail on template variables that have no value
    #[arg(long)]
    pub strict: bool,

    /// Abort once the graph grows past this many documents
    #[arg(long, value_name = "N", default_value_t = DEFAULT_DOCUMENT_LIMIT)]
    pub max_documents: usize,
}

/// Execute the build command
pub fn execute(args: BuildArgs) -> Result<()> {
    if !args.rules.exists() {
        anyhow::bail!("Rule file not found: {}", args.rules.display());
    }

    let raw = input::read_input(args.input.as_deref())?;

    let run = RunConfig {
        rules_path: args.rules,
        values_path: args.values,
        strict: args.strict,
        document_limit: args.max_documents,
    };
    let rendered = orchestrator::execute(&run, &raw)?;

    match args.output {
        Some(path) => std::fs::write(&path, rendered)
            .with_context(|| format!("Failed to write output to {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
