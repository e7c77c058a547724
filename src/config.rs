//! # Rule File and Values
//!
//! This module defines the rule file schema and the logic for loading it,
//! together with the values file that supplies the `var` bindings.
//!
//! ## Rule File
//!
//! ```yaml
//! rules:
//!   - match:
//!       kind: Deployment
//!     inject:
//!       metadata:
//!         labels:
//!           managed: "true"
//!     newResources:
//!       - service.yaml
//!     patches: deployment-patch.yaml
//! ```
//!
//! - **`match`**: subset pattern a document must satisfy (empty matches all).
//! - **`inject`**: literal fragment deep-merged into matching documents.
//! - **`newResources`**: templates rendered into brand-new documents.
//! - **`patches`**: template rendered and deep-merged into the matching
//!   document after its new resources exist. `injectFile` is accepted as a
//!   legacy spelling.
//!
//! The rule file is itself a template: it is rendered once with the `var`
//! bindings before it is parsed. Template references are resolved relative to
//! the rule file's directory.
//!
//! ## Values
//!
//! Values come from `values.yaml` next to the rule file unless another file is
//! named explicitly. A missing default values file simply means no values.

use log::warn;
use serde::Deserialize;
use serde_yaml::Mapping;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::template::TemplateRenderer;

/// Name of the values file looked up beside the rule file.
pub const DEFAULT_VALUES_FILE: &str = "values.yaml";

/// One rule: a match pattern and the effects applied on a match.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Rule {
    /// Subset pattern documents are tested against.
    #[serde(rename = "match", default)]
    pub pattern: Mapping,
    /// Literal fragment merged into matching documents.
    #[serde(default)]
    pub inject: Option<Mapping>,
    /// Template merged into matching documents after new resources exist.
    #[serde(rename = "patches", alias = "injectFile", default)]
    pub patch: Option<String>,
    /// Templates producing new documents, in order.
    #[serde(rename = "newResources", default)]
    pub new_resources: Vec<String>,
}

impl Rule {
    /// Every template this rule refers to, new resources first.
    pub fn template_references(&self) -> impl Iterator<Item = &str> {
        self.new_resources
            .iter()
            .map(String::as_str)
            .chain(self.patch.as_deref())
    }
}

/// Ordered list of rules.
pub type RuleSet = Vec<Rule>;

#[derive(Debug, Deserialize)]
struct RulesFile {
    rules: Option<RuleSet>,
}

/// Parse rendered rule-file text into a rule set.
pub fn parse(yaml_content: &str) -> Result<RuleSet> {
    if yaml_content.trim().is_empty() {
        warn!("Rule file is empty; documents will pass through unchanged");
        return Ok(RuleSet::new());
    }

    let file: RulesFile = serde_yaml::from_str(yaml_content).map_err(|err| Error::RulesParse {
        message: err.to_string(),
        hint: Some(
            "The rule file must be a mapping with a `rules` list of {match, inject, patches, newResources} entries"
                .to_string(),
        ),
    })?;

    match file.rules {
        Some(rules) => Ok(rules),
        None => {
            warn!("Rule file has no `rules` key; documents will pass through unchanged");
            Ok(RuleSet::new())
        }
    }
}

/// Render rule-file text with `vars` and parse it.
pub fn render_and_parse(
    text: &str,
    vars: &Mapping,
    renderer: &dyn TemplateRenderer,
) -> Result<RuleSet> {
    let rendered = renderer.render("rules", text, vars, None)?;
    parse(&rendered)
}

/// Load, render and parse a rule file.
pub fn from_file<P: AsRef<Path>>(
    path: P,
    vars: &Mapping,
    renderer: &dyn TemplateRenderer,
) -> Result<RuleSet> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    render_and_parse(&content, vars, renderer)
}

/// Directory template references in `rules_path` are relative to.
pub fn rules_dir(rules_path: &Path) -> PathBuf {
    match rules_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Parse values text into the `var` bindings.
pub fn parse_values(yaml_content: &str) -> Result<Mapping> {
    if yaml_content.trim().is_empty() {
        return Ok(Mapping::new());
    }
    match serde_yaml::from_str::<serde_yaml::Value>(yaml_content)? {
        serde_yaml::Value::Mapping(values) => Ok(values),
        serde_yaml::Value::Null => Ok(Mapping::new()),
        other => Err(Error::RulesParse {
            message: format!(
                "values must be a mapping, found {}",
                crate::value::type_name(&other)
            ),
            hint: None,
        }),
    }
}

/// Load the values for a run.
///
/// With an explicit `values_path` the file must exist. Otherwise
/// `values.yaml` beside the rule file is used when present.
pub fn load_values(rules_path: &Path, values_path: Option<&Path>) -> Result<Mapping> {
    let path = match values_path {
        Some(path) => path.to_path_buf(),
        None => {
            let default = rules_dir(rules_path).join(DEFAULT_VALUES_FILE);
            if !default.exists() {
                return Ok(Mapping::new());
            }
            default
        }
    };
    let content = std::fs::read_to_string(&path).map_err(Error::Io)?;
    parse_values(&content)
}
