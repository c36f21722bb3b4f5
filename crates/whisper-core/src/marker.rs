//! Recognition of recorder markers for values that are not plain data.
//!
//! The recording side serializes state with `jsan`-style references for
//! cycles (`{"$jsan": "$.path"}`) and tags executable values with
//! `{"__serializedType__": "function"}`. Cycles are rendered as a
//! placeholder; executable values make the whole step unsummarizable.

use serde_json::Value;

/// Deepest tree the pipeline will walk before giving up on a snapshot.
pub const MAX_TREE_DEPTH: usize = 128;

const CIRCULAR_KEY: &str = "$jsan";
const SERIALIZED_TYPE_KEY: &str = "__serializedType__";
const EXECUTABLE_TYPES: &[&str] = &["function", "symbol"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker<'a> {
    /// Back-reference to an ancestor, by recorder path.
    CircularRef(&'a str),
    /// A function or symbol the recorder could not capture as data.
    Executable(&'a str),
}

/// A snapshot value that cannot be turned into change text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("executable value ({kind}) at `{path}`")]
    Executable { path: String, kind: String },
    #[error("tree deeper than {max} levels at `{path}`")]
    TooDeep { path: String, max: usize },
}

/// Classify a single node. Only single-key marker objects are recognized.
pub fn classify(value: &Value) -> Option<Marker<'_>> {
    let map = value.as_object()?;
    if let Some(target) = map.get(CIRCULAR_KEY).and_then(|v| v.as_str()) {
        if map.len() == 1 {
            return Some(Marker::CircularRef(target));
        }
    }
    let kind = map.get(SERIALIZED_TYPE_KEY).and_then(|v| v.as_str())?;
    EXECUTABLE_TYPES
        .contains(&kind)
        .then_some(Marker::Executable(kind))
}

/// Placeholder leaf for a circular reference.
pub fn circular_placeholder(target: &str) -> String {
    format!("[circular reference to {target}]")
}

/// Copy of `value` with every circular reference replaced by its placeholder.
pub fn replace_circular(value: &Value) -> Value {
    if let Some(Marker::CircularRef(target)) = classify(value) {
        return Value::String(circular_placeholder(target));
    }
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), replace_circular(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(replace_circular).collect()),
        other => other.clone(),
    }
}

/// Walk the tree and report the first value that makes it unsummarizable.
pub fn check_summarizable(value: &Value) -> Result<(), ValueError> {
    walk(value, "", 0)
}

/// Same as [`check_summarizable`] for a value found at `path`, `depth`
/// levels below the snapshot root.
pub fn check_summarizable_at(value: &Value, path: &str, depth: usize) -> Result<(), ValueError> {
    walk(value, path, depth)
}

fn walk(value: &Value, path: &str, depth: usize) -> Result<(), ValueError> {
    if depth > MAX_TREE_DEPTH {
        return Err(ValueError::TooDeep {
            path: path.to_string(),
            max: MAX_TREE_DEPTH,
        });
    }
    match classify(value) {
        Some(Marker::Executable(kind)) => {
            return Err(ValueError::Executable {
                path: path.to_string(),
                kind: kind.to_string(),
            })
        }
        Some(Marker::CircularRef(_)) => return Ok(()),
        None => {}
    }
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                walk(child, &child_path(path, key), depth + 1)?;
            }
            Ok(())
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                walk(child, &child_path(path, &i.to_string()), depth + 1)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}
