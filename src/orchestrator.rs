//! Orchestrator for a complete build
//!
//! Wires the file-based collaborators to the engine:
//! 1. Load the values (`values.yaml` beside the rule file, or an explicit file)
//! 2. Render and parse the rule file with those values
//! 3. Parse the input stream and apply the rules
//! 4. Serialize the resulting graph

use log::info;
use std::path::{Path, PathBuf};

use crate::codec::{serialize_documents, YamlCodec};
use crate::config;
use crate::engine::{RuleEngine, DEFAULT_DOCUMENT_LIMIT};
use crate::error::Result;
use crate::graph::Graph;
use crate::template::{DirectorySource, HandlebarsRenderer};

/// Settings for one build.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub rules_path: PathBuf,
    pub values_path: Option<PathBuf>,
    /// Fail on missing template variables.
    pub strict: bool,
    pub document_limit: usize,
}

impl RunConfig {
    pub fn new<P: AsRef<Path>>(rules_path: P) -> Self {
        Self {
            rules_path: rules_path.as_ref().to_path_buf(),
            values_path: None,
            strict: false,
            document_limit: DEFAULT_DOCUMENT_LIMIT,
        }
    }
}

/// Build the graph for `input` under the rules named by `run`.
pub fn build_graph(run: &RunConfig, input: &str) -> Result<Graph> {
    let vars = config::load_values(&run.rules_path, run.values_path.as_deref())?;
    let renderer = HandlebarsRenderer::new().strict(run.strict);
    let rules = config::from_file(&run.rules_path, &vars, &renderer)?;
    info!(
        "Loaded {} rule(s) from {}",
        rules.len(),
        run.rules_path.display()
    );

    let templates = DirectorySource::new(config::rules_dir(&run.rules_path));
    RuleEngine::new(&rules, &vars, &templates, &renderer, &YamlCodec)
        .with_document_limit(run.document_limit)
        .build(input)
}

/// Build and serialize: the whole pipeline from input text to output text.
pub fn execute(run: &RunConfig, input: &str) -> Result<String> {
    let graph = build_graph(run, input)?;
    serialize_documents(&YamlCodec, &graph)
}
