//! Document text encoding
//!
//! The engine only ever sees decoded values; the [`Codec`] trait is the seam
//! to the text format. [`YamlCodec`] is the implementation used everywhere in
//! practice. Multi-document streams are separated by `---` lines in both
//! directions.

use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};
use crate::graph::{Document, Graph};

/// Marker line separating documents in a stream.
pub const DOCUMENT_SEPARATOR: &str = "---";

/// Converts between document text and value trees.
pub trait Codec {
    /// Decode one document.
    fn parse(&self, text: &str) -> Result<Value>;

    /// Encode one document.
    fn serialize(&self, value: &Value) -> Result<String>;
}

/// YAML codec backed by `serde_yaml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl Codec for YamlCodec {
    fn parse(&self, text: &str) -> Result<Value> {
        serde_yaml::from_str(text).map_err(|err| Error::Parse {
            message: format!("{}\n{}", err, text),
            hint: None,
        })
    }

    fn serialize(&self, value: &Value) -> Result<String> {
        serde_yaml::to_string(value).map_err(|err| Error::Serialization {
            message: err.to_string(),
        })
    }
}

fn is_separator(line: &str) -> bool {
    let Some(rest) = line.trim_end().strip_prefix(DOCUMENT_SEPARATOR) else {
        return false;
    };
    rest.is_empty() || (rest.starts_with(char::is_whitespace) && rest.trim_start().starts_with('#'))
}

/// Split a stream into trimmed, non-empty document fragments.
pub fn split_documents(text: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut start = 0;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        if is_separator(line) {
            fragments.push(&text[start..offset]);
            start = offset + line.len();
        }
        offset += line.len();
    }
    fragments.push(&text[start..]);

    fragments
        .into_iter()
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

/// Decode every document of a stream, validating each one's `kind`.
pub fn parse_documents(codec: &dyn Codec, text: &str) -> Result<Vec<Document>> {
    split_documents(text)
        .into_iter()
        .map(|fragment| Document::from_value(codec.parse(fragment)?, fragment))
        .collect()
}

/// Decode a single mapping, treating empty text or `null` as an empty mapping.
pub fn parse_mapping(codec: &dyn Codec, text: &str) -> Result<Mapping> {
    if text.trim().is_empty() {
        return Ok(Mapping::new());
    }
    match codec.parse(text)? {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        other => Err(Error::Parse {
            message: format!(
                "expected a mapping but found {}:\n{}",
                crate::value::type_name(&other),
                text
            ),
            hint: None,
        }),
    }
}

/// Encode every document of the graph as one `---`-separated stream.
pub fn serialize_documents(codec: &dyn Codec, graph: &Graph) -> Result<String> {
    let mut out = String::new();
    for document in graph {
        let encoded = codec.serialize(&Value::Mapping(document.body().clone()))?;
        out.push_str(DOCUMENT_SEPARATOR);
        out.push('\n');
        out.push_str(&encoded);
        if !encoded.ends_with('\n') {
            out.push('\n');
        }
    }
    Ok(out)
}
