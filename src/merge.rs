//! Deep merging of YAML mappings
//!
//! Inject fragments and rendered patches are folded into a document body with
//! [`merge`]. The rules, applied per key of the source:
//!
//! - key absent from the destination: copied over
//! - both values are mappings: merged recursively
//! - both values are sequences: source items appended after destination items
//! - anything else: the source value replaces the destination value
//!
//! Tags are looked through, so a tagged mapping still merges key by key and
//! keeps its tag. No key is ever removed. Sequence concatenation makes the
//! merge deliberately non-idempotent: merging the same fragment twice
//! duplicates its list items.

use log::trace;
use serde_yaml::{Mapping, Value};

use crate::value::{stringify, type_name, untagged, untagged_mut};

/// Merge `src` into `dst` in place.
pub fn merge(dst: &mut Mapping, src: &Mapping) {
    merge_at(dst, src, "");
}

fn merge_at(dst: &mut Mapping, src: &Mapping, path: &str) {
    for (key, value) in src {
        let key_path = if path.is_empty() {
            stringify(key)
        } else {
            format!("{}.{}", path, stringify(key))
        };

        let Some(existing) = dst.get_mut(key) else {
            dst.insert(key.clone(), value.clone());
            continue;
        };

        let source = untagged(value);
        let recurse = matches!(
            (untagged(existing), source),
            (Value::Mapping(_), Value::Mapping(_)) | (Value::Sequence(_), Value::Sequence(_))
        );
        if !recurse {
            trace!(
                "Overwriting value at path '{}': {} -> {}",
                key_path,
                type_name(existing),
                type_name(value)
            );
            *existing = value.clone();
            continue;
        }

        match (untagged_mut(existing), source) {
            (Value::Mapping(existing_map), Value::Mapping(source_map)) => {
                merge_at(existing_map, source_map, &key_path);
            }
            (Value::Sequence(existing_seq), Value::Sequence(source_seq)) => {
                existing_seq.extend(source_seq.iter().cloned());
            }
            _ => {}
        }
    }
}
