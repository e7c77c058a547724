//! Cross-reference selectors
//!
//! Templates pull values out of other documents with compact queries of the
//! form `LEFT & RIGHT` or `LEFT & KEY.VALUE & RIGHT`. `LEFT` picks a document
//! by kind (and optionally by a field value), `RIGHT` is the dot path of the
//! value to return from it.
//!
//! | Query | Picks the first document of kind `K` ... |
//! |---|---|
//! | `kind.K & path` | ... of any shape |
//! | `kind.K.a.b.V & path` | ... whose `a.b` stringifies to `V` |
//! | `kind.K.a.b & KEY.V & path` | ... whose `a.b` is a mapping with `KEY` stringifying to `V` |
//!
//! Kinds compare case-insensitively and documents are scanned in graph
//! order. A query that finds no document resolves to [`NO_MATCH`]; a query
//! that does not follow the grammar is an [`Error::SelectorSyntax`].

use log::debug;
use serde_yaml::{Mapping, Value};
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::path::{split_path, walk_mapping, Lookup};
use crate::value::{stringify, untagged};

/// Marker returned when no document satisfies a selector.
pub const NO_MATCH: &str = "<no match>";

/// A parsed cross-reference query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// `kind.K & field`
    Kind { kind: String, field: Vec<String> },
    /// `kind.K.attr...V & field`
    Attribute {
        kind: String,
        attr_path: Vec<String>,
        attr_value: String,
        field: Vec<String>,
    },
    /// `kind.K.attr... & KEY.V & field`
    MapEntry {
        kind: String,
        attr_path: Vec<String>,
        key: String,
        value: String,
        field: Vec<String>,
    },
}

/// Result of evaluating a selector against a graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The value at the requested field of the first matching document. This
    /// may itself be a path sentinel such as `<missing: x>`.
    Found(Value),
    NoMatch,
}

impl Resolution {
    pub fn is_match(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }

    /// The resolved value, with [`NO_MATCH`] standing in for no match.
    pub fn into_value(self) -> Value {
        match self {
            Resolution::Found(value) => value,
            Resolution::NoMatch => Value::String(NO_MATCH.to_string()),
        }
    }
}

fn owned(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| s.to_string()).collect()
}

fn syntax_error(query: &str, message: impl Into<String>) -> Error {
    Error::SelectorSyntax {
        query: query.to_string(),
        message: message.into(),
    }
}

impl Selector {
    /// Parse a query string.
    pub fn parse(query: &str) -> Result<Self> {
        let clauses: Vec<&str> = query.split('&').map(str::trim).collect();

        match clauses.as_slice() {
            [_] => Err(syntax_error(
                query,
                "expected 'LEFT & RIGHT' or 'LEFT & KEY.VALUE & RIGHT'",
            )),
            [left, right] => {
                let left_parts = split_path(left);
                let field = owned(&split_path(right));
                match left_parts.len() {
                    2 => Ok(Selector::Kind {
                        kind: left_parts[1].to_string(),
                        field,
                    }),
                    n if n >= 4 => Ok(Selector::Attribute {
                        kind: left_parts[1].to_string(),
                        attr_path: owned(&left_parts[2..n - 1]),
                        attr_value: left_parts[n - 1].to_string(),
                        field,
                    }),
                    n => Err(syntax_error(
                        query,
                        format!(
                            "left selector '{}' has {} segments; expected 'kind.K' or 'kind.K.path.VALUE'",
                            left, n
                        ),
                    )),
                }
            }
            [left, map_match, right] => {
                let left_parts = split_path(left);
                if left_parts.len() < 3 {
                    return Err(syntax_error(
                        query,
                        format!("left selector '{}' must be 'kind.K.path'", left),
                    ));
                }
                let Some((key, value)) = map_match.split_once('.') else {
                    return Err(syntax_error(
                        query,
                        format!("map match '{}' must be 'KEY.VALUE'", map_match),
                    ));
                };
                Ok(Selector::MapEntry {
                    kind: left_parts[1].to_string(),
                    attr_path: owned(&left_parts[2..]),
                    key: key.to_string(),
                    value: value.to_string(),
                    field: owned(&split_path(right)),
                })
            }
            _ => Err(syntax_error(
                query,
                format!("expected at most 3 '&'-separated clauses, found {}", clauses.len()),
            )),
        }
    }

    /// The document kind this selector scans.
    pub fn kind(&self) -> &str {
        match self {
            Selector::Kind { kind, .. }
            | Selector::Attribute { kind, .. }
            | Selector::MapEntry { kind, .. } => kind,
        }
    }

    fn field(&self) -> &[String] {
        match self {
            Selector::Kind { field, .. }
            | Selector::Attribute { field, .. }
            | Selector::MapEntry { field, .. } => field,
        }
    }

    /// Whether a body of the selected kind passes the selector's filter.
    fn accepts(&self, body: &Mapping) -> bool {
        match self {
            Selector::Kind { .. } => true,
            Selector::Attribute {
                attr_path,
                attr_value,
                ..
            } => walk_mapping(body, attr_path).to_string() == *attr_value,
            Selector::MapEntry {
                attr_path,
                key,
                value,
                ..
            } => {
                let found = match walk_mapping(body, attr_path) {
                    Lookup::Found(found) => untagged(found).as_mapping(),
                    Lookup::Root(map) => Some(map),
                    _ => None,
                };
                found.is_some_and(|map| {
                    map.iter()
                        .any(|(k, v)| stringify(k) == *key && stringify(v) == *value)
                })
            }
        }
    }

    /// Evaluate against `graph`, scanning documents in graph order.
    pub fn resolve(&self, graph: &Graph) -> Resolution {
        let mut candidates = 0;
        for document in graph.of_kind(self.kind()) {
            candidates += 1;
            if self.accepts(document.body()) {
                return Resolution::Found(walk_mapping(document.body(), self.field()).into_value());
            }
        }

        debug!(
            "Selector {:?} matched none of {} '{}' document(s)",
            self,
            candidates,
            self.kind()
        );
        Resolution::NoMatch
    }
}

impl FromStr for Selector {
    type Err = Error;

    fn from_str(query: &str) -> Result<Self> {
        Selector::parse(query)
    }
}

/// Parse `query` and evaluate it against `graph`.
pub fn resolve(graph: &Graph, query: &str) -> Result<Resolution> {
    Ok(Selector::parse(query)?.resolve(graph))
}
