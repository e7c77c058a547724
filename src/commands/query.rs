//! Query command implementation
//!
//! Resolves one selector against the input manifests, without applying any
//! rules, and prints the value as YAML. Handy when a `resource` call in a
//! template does not produce what was expected.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use kubegraph::codec::{self, Codec, YamlCodec};
use kubegraph::graph::Graph;
use kubegraph::input;
use kubegraph::selector::{self, Resolution};

/// Arguments for the query command
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Selector, e.g. "kind.Service.metadata.name.api & spec.clusterIP"
    #[arg(value_name = "SELECTOR")]
    pub selector: String,

    /// Manifest file or directory (defaults to stdin, then the current directory)
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,
}

/// Execute the query command
pub fn execute(args: QueryArgs) -> Result<()> {
    let raw = input::read_input(args.input.as_deref())?;
    let graph: Graph = codec::parse_documents(&YamlCodec, &raw)?
        .into_iter()
        .collect();

    match selector::resolve(&graph, &args.selector)? {
        Resolution::Found(value) => print!("{}", YamlCodec.serialize(&value)?),
        Resolution::NoMatch => println!("{}", selector::NO_MATCH),
    }
    Ok(())
}
