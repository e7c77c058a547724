//! Value tree helpers
//!
//! Documents are held as `serde_yaml` values. This module provides the single
//! canonical stringification used whenever two values are compared as text
//! (pattern matching and selector filters), plus a few small accessors shared
//! by the path walker, matcher and resolver.

use serde_yaml::{Mapping, Value};

/// Render a value as the text used for equality checks.
///
/// Scalars render as their plain YAML text (`null`, `true`, `42`, `1.5`,
/// `my-svc`). Sequences render as `[a, b]` and mappings as `{k: v}` in
/// insertion order. Tagged values render as their inner value.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(seq) => {
            let items: Vec<String> = seq.iter().map(stringify).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Mapping(map) => stringify_mapping(map),
        Value::Tagged(tagged) => stringify(&tagged.value),
    }
}

/// [`stringify`] for a bare mapping.
pub fn stringify_mapping(map: &Mapping) -> String {
    let entries: Vec<String> = map
        .iter()
        .map(|(k, v)| format!("{}: {}", stringify(k), stringify(v)))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

/// Strip any YAML tags, returning the underlying value.
pub fn untagged(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untagged(&tagged.value),
        other => other,
    }
}

/// Mutable counterpart of [`untagged`].
pub fn untagged_mut(value: &mut Value) -> &mut Value {
    match value {
        Value::Tagged(tagged) => untagged_mut(&mut tagged.value),
        other => other,
    }
}

/// Look up a mapping entry by name.
///
/// An exact string key wins; otherwise the first key (in insertion order)
/// whose stringified form equals `name` is used, so `80` finds an integer key.
pub fn get_by_name<'a>(map: &'a Mapping, name: &str) -> Option<&'a Value> {
    map.get(name).or_else(|| {
        map.iter()
            .find(|(key, _)| !key.is_string() && stringify(key) == name)
            .map(|(_, value)| value)
    })
}

/// Get a human-readable type name for a YAML value
///
/// Used for logging and error messages to describe the type of a value.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "Null",
        Value::Bool(_) => "Bool",
        Value::Number(_) => "Number",
        Value::String(_) => "String",
        Value::Sequence(_) => "Sequence",
        Value::Mapping(_) => "Mapping",
        Value::Tagged(_) => "Tagged",
    }
}
