//! Subset matching of documents against rule patterns
//!
//! A pattern is a mapping whose every key must be present in the document.
//! Nested mappings recurse; any other pattern value is compared with the
//! document's value through [`stringify`], so `replicas: "3"` matches
//! `replicas: 3`. Keys the pattern does not mention are ignored, and an empty
//! pattern matches every document.

use serde_yaml::{Mapping, Value};

use crate::value::{get_by_name, stringify, untagged};

/// Whether `actual` satisfies `pattern`.
pub fn matches(actual: &Mapping, pattern: &Mapping) -> bool {
    pattern.iter().all(|(key, expected)| {
        let found = match actual.get(key) {
            Some(found) => found,
            None => match get_by_name(actual, &stringify(key)) {
                Some(found) => found,
                None => return false,
            },
        };

        match untagged(expected) {
            Value::Mapping(nested) => match untagged(found) {
                Value::Mapping(found_map) => matches(found_map, nested),
                _ => false,
            },
            _ => stringify(found) == stringify(expected),
        }
    })
}
