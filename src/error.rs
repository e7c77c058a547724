//! # Error Handling
//!
//! This module defines the centralized error type for `kubegraph`. It uses the
//! `thiserror` library to build a single `Error` enum covering every failure
//! mode of the rule engine and its collaborators.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum representing all errors that can occur while
//!   loading rules, parsing documents, resolving cross-references, rendering
//!   templates or writing output.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the library.
//!
//! Every variant is fatal for a run. The one recoverable condition, a missing
//! key or bad index while walking a path, is not an error at all: the path
//! walker returns a sentinel value instead (see [`crate::path`]).

use thiserror::Error;

/// Main error type for kubegraph operations
#[derive(Error, Debug)]
pub enum Error {
    /// A document (input, new resource or patch) could not be decoded.
    #[error("Document parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Parse {
        message: String,
        /// Optional hint for how to fix the document
        hint: Option<String>,
    },

    /// A document decoded to a mapping but has no usable `kind`.
    ///
    /// `document` holds the offending text, or its name when the text is
    /// not available.
    #[error("Document is missing a non-empty string `kind`:\n{document}")]
    MissingKind { document: String },

    /// A cross-reference query did not follow the selector grammar.
    #[error("Selector syntax error in '{query}': {message}")]
    SelectorSyntax { query: String, message: String },

    /// The template renderer failed.
    ///
    /// Includes the template name when known.
    #[error("Template processing error: {message}{}", template.as_ref().map(|t| format!(" (template: {})", t)).unwrap_or_default())]
    Template {
        message: String,
        /// The template that failed, if applicable
        template: Option<String>,
    },

    /// A rule referenced a template that could not be loaded.
    #[error("Template not found: {reference} - {message}")]
    TemplateNotFound { reference: String, message: String },

    /// The rule file could not be decoded into a rule set.
    #[error("Rules parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    RulesParse {
        message: String,
        /// Optional hint for how to fix the rule file
        hint: Option<String>,
    },

    /// Input documents could not be collected.
    #[error("Input error: {message}")]
    Input { message: String },

    /// The graph grew past the configured document limit.
    #[error("Document limit of {limit} exceeded; a rule is probably matching the resources it creates")]
    DocumentLimit { limit: usize },

    /// An error occurred during serialization.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON conversion error, wrapped from `serde_json::Error`.
    #[error("JSON conversion error: {0}")]
    Json(#[from] serde_json::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A directory traversal error, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
