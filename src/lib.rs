//! # kubegraph
//!
//! A rule engine for batches of Kubernetes-style manifests. Rules match
//! documents by pattern, merge in extra fields, spawn new documents from
//! templates and patch documents with values taken from other documents in
//! the same batch.
//!
//! ## Quick Example
//!
//! ```
//! use kubegraph::codec::{serialize_documents, YamlCodec};
//! use kubegraph::config;
//! use kubegraph::engine::RuleEngine;
//! use kubegraph::template::{HandlebarsRenderer, MemorySource};
//!
//! let rules = config::parse(r#"
//! rules:
//!   - match: {kind: Deployment}
//!     newResources: [service.yaml]
//! "#).unwrap();
//!
//! let templates = MemorySource::new().with(
//!     "service.yaml",
//!     "kind: Service\nmetadata:\n  name: {{resource \"kind.Deployment & metadata.name\"}}",
//! );
//! let vars = serde_yaml::Mapping::new();
//! let renderer = HandlebarsRenderer::new();
//!
//! let graph = RuleEngine::new(&rules, &vars, &templates, &renderer, &YamlCodec)
//!     .build("kind: Deployment\nmetadata:\n  name: web")
//!     .unwrap();
//!
//! assert_eq!(graph.len(), 2);
//! let out = serialize_documents(&YamlCodec, &graph).unwrap();
//! assert!(out.contains("name: web"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Graph (`graph`)**: the ordered, append-only collection of documents.
//! - **Matcher (`matcher`)**: subset predicates deciding which rules apply.
//! - **Merge (`merge`)**: the deep merge used by `inject` and `patches`.
//! - **Selectors (`selector`)**: the `kind.X & path` cross-reference language
//!   exposed to templates as `resource`.
//! - **Engine (`engine`)**: the rule-application loop over the live graph.
//!
//! The rule file schema lives in `config`; text handling lives in `codec`,
//! `template` and `input`. `orchestrator` wires the file-based pieces
//! together for the command-line tool.

pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod input;
pub mod matcher;
pub mod merge;
pub mod orchestrator;
pub mod output;
pub mod path;
pub mod selector;
pub mod template;
pub mod value;

#[cfg(test)]
mod engine_proptest;
