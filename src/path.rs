//! Path walking for cross-reference lookups
//!
//! A path is a dot-separated list of segments (`spec.ports.0.port`). Mapping
//! segments are keys, sequence segments are zero-based indices. Walking never
//! fails: problems are reported through [`Lookup`] sentinels that render as
//! descriptive markers, so a bad reference shows up inline in the output
//! instead of aborting the run.

use serde_yaml::{Mapping, Value};
use std::fmt;

use crate::value::{get_by_name, stringify, stringify_mapping, untagged};

/// Outcome of walking a path through a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<'a> {
    /// The path resolved to this value.
    Found(&'a Value),
    /// An empty path walked from a root mapping.
    Root(&'a Mapping),
    /// A mapping had no entry for the segment.
    Missing(String),
    /// A sequence segment was not an in-bounds, non-negative integer.
    InvalidIndex(String),
    /// A segment remained but the current value is a scalar.
    UnexpectedNode(String),
}

impl Lookup<'_> {
    /// Clone the found value, or turn the sentinel into its marker string.
    pub fn into_value(self) -> Value {
        match self {
            Lookup::Found(value) => value.clone(),
            Lookup::Root(map) => Value::Mapping(map.clone()),
            sentinel => Value::String(sentinel.to_string()),
        }
    }
}

impl fmt::Display for Lookup<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Found(value) => f.write_str(&stringify(value)),
            Lookup::Root(map) => f.write_str(&stringify_mapping(map)),
            Lookup::Missing(segment) => write!(f, "<missing: {}>", segment),
            Lookup::InvalidIndex(segment) => write!(f, "<invalid index: {}>", segment),
            Lookup::UnexpectedNode(segment) => write!(f, "<unexpected node at: {}>", segment),
        }
    }
}

/// Split a dot-separated path into its segments.
///
/// An empty path string yields a single empty segment, matching how the
/// selector grammar treats an empty field reference.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('.').collect()
}

/// Walk `path` from `value`.
///
/// An empty segment list returns `value` itself.
pub fn walk<'a, S: AsRef<str>>(value: &'a Value, path: &[S]) -> Lookup<'a> {
    let mut current = value;
    for segment in path {
        let segment = segment.as_ref();
        current = match untagged(current) {
            Value::Mapping(map) => match get_by_name(map, segment) {
                Some(next) => next,
                None => return Lookup::Missing(segment.to_string()),
            },
            Value::Sequence(seq) => match segment.parse::<usize>().ok().and_then(|i| seq.get(i)) {
                Some(next) => next,
                None => return Lookup::InvalidIndex(segment.to_string()),
            },
            _ => return Lookup::UnexpectedNode(segment.to_string()),
        };
    }
    Lookup::Found(current)
}

/// Walk `path` from a document body without cloning it into a [`Value`].
pub fn walk_mapping<'a, S: AsRef<str>>(map: &'a Mapping, path: &[S]) -> Lookup<'a> {
    let Some((first, rest)) = path.split_first() else {
        return Lookup::Root(map);
    };
    let first = first.as_ref();
    match get_by_name(map, first) {
        Some(next) => walk(next, rest),
        None => Lookup::Missing(first.to_string()),
    }
}
