//! Property-based tests for the matcher, merge and stream splitting.
//!
//! These tests use proptest to generate random value trees and check that
//! the engine's building blocks keep their invariants for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::codec::split_documents;
    use crate::matcher::matches;
    use crate::merge::merge;
    use crate::path::{walk, Lookup};
    use proptest::prelude::*;
    use serde_yaml::{Mapping, Value};

    fn leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-z0-9]{0,6}".prop_map(Value::String),
        ]
    }

    fn tree() -> impl Strategy<Value = Value> {
        leaf().prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Sequence),
                prop::collection::btree_map("[a-d]{1,2}", inner, 0..4).prop_map(to_mapping),
            ]
        })
    }

    /// Trees without sequences anywhere.
    fn flat_tree() -> impl Strategy<Value = Value> {
        leaf().prop_recursive(3, 24, 4, |inner| {
            prop::collection::btree_map("[a-d]{1,2}", inner, 0..4).prop_map(to_mapping)
        })
    }

    fn to_mapping(entries: std::collections::BTreeMap<String, Value>) -> Value {
        Value::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (Value::String(k), v))
                .collect(),
        )
    }

    fn mapping() -> impl Strategy<Value = Mapping> {
        prop::collection::btree_map("[a-d]{1,2}", tree(), 0..5).prop_map(|entries| {
            entries
                .into_iter()
                .map(|(k, v)| (Value::String(k), v))
                .collect()
        })
    }

    fn flat_mapping() -> impl Strategy<Value = Mapping> {
        prop::collection::btree_map("[a-d]{1,2}", flat_tree(), 0..5).prop_map(|entries| {
            entries
                .into_iter()
                .map(|(k, v)| (Value::String(k), v))
                .collect()
        })
    }

    // ============================================================================
    // matcher properties
    // ============================================================================

    proptest! {
        /// Property: the empty pattern matches every mapping
        #[test]
        fn empty_pattern_matches_everything(actual in mapping()) {
            prop_assert!(matches(&actual, &Mapping::new()));
        }

        /// Property: every mapping matches itself
        #[test]
        fn mapping_matches_itself(actual in mapping()) {
            prop_assert!(matches(&actual, &actual));
        }

        /// Property: a pattern with a key the document lacks never matches
        #[test]
        fn extra_pattern_key_never_matches(actual in mapping(), value in leaf()) {
            let mut pattern = actual.clone();
            pattern.insert(Value::from("zz-absent"), value);
            prop_assert!(!matches(&actual, &pattern));
        }
    }

    // ============================================================================
    // merge properties
    // ============================================================================

    proptest! {
        /// Property: merging into an empty mapping yields the source
        #[test]
        fn merge_into_empty_is_copy(src in mapping()) {
            let mut dst = Mapping::new();
            merge(&mut dst, &src);
            prop_assert_eq!(dst, src);
        }

        /// Property: merging never removes a key from the destination
        #[test]
        fn merge_never_deletes_keys(dst in mapping(), src in mapping()) {
            let mut merged = dst.clone();
            merge(&mut merged, &src);
            for key in dst.keys().chain(src.keys()) {
                prop_assert!(merged.contains_key(key));
            }
        }

        /// Property: self-merge doubles every top-level sequence
        #[test]
        fn self_merge_doubles_sequences(a in mapping()) {
            let mut merged = a.clone();
            merge(&mut merged, &a);
            for (key, value) in &a {
                if let Value::Sequence(items) = value {
                    let doubled = merged[key].as_sequence().map(Vec::len);
                    prop_assert_eq!(doubled, Some(items.len() * 2));
                }
            }
        }

        /// Property: without sequences, the merged result satisfies the source
        /// as a pattern
        #[test]
        fn merged_result_matches_sequence_free_source(dst in mapping(), src in flat_mapping()) {
            let mut merged = dst;
            merge(&mut merged, &src);
            prop_assert!(matches(&merged, &src));
        }
    }

    // ============================================================================
    // walker and splitter properties
    // ============================================================================

    proptest! {
        /// Property: walking the empty path returns the value itself
        #[test]
        fn empty_path_walk_is_identity(value in tree()) {
            let empty: [&str; 0] = [];
            prop_assert!(matches!(walk(&value, &empty), Lookup::Found(v) if v == &value));
        }

        /// Property: split fragments are never empty and never padded
        #[test]
        fn split_fragments_are_trimmed_and_non_empty(
            lines in prop::collection::vec(prop_oneof![
                Just("---".to_string()),
                Just("".to_string()),
                "[a-z: -]{0,12}",
            ], 0..12)
        ) {
            let text = lines.join("\n");
            for fragment in split_documents(&text) {
                prop_assert!(!fragment.is_empty());
                prop_assert_eq!(fragment, fragment.trim());
            }
        }
    }
}
