//! # Validate Command Implementation
//!
//! Checks a rule file without touching any manifests:
//!
//! - **Values**: the values file (explicit or default) parses as a mapping.
//! - **Rules**: the rule file renders with those values and parses.
//! - **Templates**: every template a rule references exists beside the rule
//!   file and compiles.
//!
//! Rules with no effect (no `inject`, `patches` or `newResources`) are
//! reported as warnings. Any error gives a non-zero exit.

use anyhow::Result;
use clap::Args;
use std::collections::BTreeSet;
use std::path::PathBuf;

use kubegraph::config;
use kubegraph::output::{OutputConfig, Status};
use kubegraph::template::{
    DirectorySource, HandlebarsRenderer, TemplateRenderer, TemplateSource,
};

/// Validate a rule file and its templates
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Rule file to validate
    #[arg(short, long, value_name = "PATH", env = "KUBEGRAPH_RULES")]
    pub rules: PathBuf,

    /// Values file (defaults to values.yaml beside the rule file)
    #[arg(long, value_name = "PATH")]
    pub values: Option<PathBuf>,

    /// Treat warnings as errors and fail on missing template variables
    #[arg(long)]
    pub strict: bool,
}

/// Execute the `validate` command.
///
/// `color_flag` is the global `--color` value.
pub fn execute(args: ValidateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    println!(
        "{} Validating rules: {}",
        out.marker(Status::Scan),
        args.rules.display()
    );

    let vars = match config::load_values(&args.rules, args.values.as_deref()) {
        Ok(vars) => vars,
        Err(e) => {
            println!("{} Values could not be loaded: {}", out.marker(Status::Error), e);
            anyhow::bail!("Values loading failed: {}", e);
        }
    };

    let renderer = HandlebarsRenderer::new().strict(args.strict);
    let rules = match config::from_file(&args.rules, &vars, &renderer) {
        Ok(rules) => {
            println!("{} Rule file parsed successfully", out.marker(Status::Ok));
            rules
        }
        Err(e) => {
            println!("{} Rule file parsing failed: {}", out.marker(Status::Error), e);
            anyhow::bail!("Rule file parsing failed: {}", e);
        }
    };

    let mut has_warnings = false;
    let mut has_errors = false;

    let references: BTreeSet<&str> = rules
        .iter()
        .flat_map(|rule| rule.template_references())
        .collect();

    println!("\n{} Rule Summary:", out.marker(Status::Info));
    println!("   Total rules: {}", rules.len());
    println!("   Templates referenced: {}", references.len());

    for (index, rule) in rules.iter().enumerate() {
        if rule.inject.is_none() && rule.patch.is_none() && rule.new_resources.is_empty() {
            println!(
                "{} Rule {} has no inject, patches or newResources",
                out.marker(Status::Warn),
                index
            );
            has_warnings = true;
        }
    }

    if !references.is_empty() {
        println!("\n{} Checking templates...", out.marker(Status::Scan));
    }
    let source = DirectorySource::new(config::rules_dir(&args.rules));
    for reference in &references {
        let checked = source
            .load(reference)
            .and_then(|text| renderer.check(reference, &text));
        match checked {
            Ok(()) => println!("{} {}", out.marker(Status::Ok), reference),
            Err(e) => {
                println!("{} {}: {}", out.marker(Status::Error), reference, e);
                has_errors = true;
            }
        }
    }

    println!();
    if has_errors {
        println!("{} Validation failed", out.marker(Status::Error));
        anyhow::bail!("Validation failed");
    }
    if has_warnings && args.strict {
        println!(
            "{} Validation failed (strict mode, warnings present)",
            out.marker(Status::Error)
        );
        anyhow::bail!("Validation failed in strict mode");
    }
    if has_warnings {
        println!("{} Validation passed with warnings", out.marker(Status::Warn));
    } else {
        println!("{} Validation passed", out.marker(Status::Ok));
    }
    Ok(())
}
