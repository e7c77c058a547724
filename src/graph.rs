//! Documents and the resource graph
//!
//! The [`Graph`] is the ordered, append-only collection of every document seen
//! in a run: the parsed input first, then each resource spawned by a rule in
//! the order it was created. Documents are mutated in place by merges but are
//! never removed or reordered, so an index handed out once stays valid.

use serde_yaml::{Mapping, Value};
use std::ops::Index;

use crate::error::{Error, Result};
use crate::value::untagged;

/// One parsed manifest: its `kind` and its body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    kind: String,
    body: Mapping,
}

impl Document {
    /// Build a document from a decoded value.
    ///
    /// The value must be a mapping with a non-empty string `kind`. `source`
    /// is the text the value came from and is only used in error messages.
    pub fn from_value(value: Value, source: &str) -> Result<Self> {
        let body = match value {
            Value::Mapping(body) => body,
            other => {
                return Err(Error::Parse {
                    message: format!(
                        "expected a mapping but found {}:\n{}",
                        crate::value::type_name(&other),
                        source
                    ),
                    hint: Some("Each document must be a YAML mapping with a `kind` field".to_string()),
                })
            }
        };
        Self::from_body(body, source)
    }

    /// Build a document from a mapping, extracting its `kind`.
    pub fn from_body(body: Mapping, source: &str) -> Result<Self> {
        let kind = match body.get("kind").map(untagged) {
            Some(Value::String(kind)) if !kind.is_empty() => kind.clone(),
            _ => {
                return Err(Error::MissingKind {
                    document: source.to_string(),
                })
            }
        };
        Ok(Self { kind, body })
    }

    /// The identity tag captured when the document was parsed.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn body(&self) -> &Mapping {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Mapping {
        &mut self.body
    }

    /// The body as a standalone value, e.g. for path walking.
    pub fn as_value(&self) -> Value {
        Value::Mapping(self.body.clone())
    }

}

/// Ordered, append-only collection of documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    documents: Vec<Document>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document at the end of the graph.
    pub fn push(&mut self, document: Document) {
        self.documents.push(document);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Document> {
        self.documents.get_mut(index)
    }

    /// Iterate over all documents in graph order.
    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    /// Iterate over documents of `kind` (case-insensitive) in graph order.
    pub fn of_kind(&self, kind: &str) -> impl Iterator<Item = &Document> + '_ {
        let kind = kind.to_lowercase();
        self.documents
            .iter()
            .filter(move |doc| doc.kind.to_lowercase() == kind)
    }
}

impl Index<usize> for Graph {
    type Output = Document;

    fn index(&self, index: usize) -> &Document {
        &self.documents[index]
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}

impl FromIterator<Document> for Graph {
    fn from_iter<T: IntoIterator<Item = Document>>(iter: T) -> Self {
        Self {
            documents: iter.into_iter().collect(),
        }
    }
}
