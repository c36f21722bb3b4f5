use serde_json::Value;
use std::collections::BTreeMap;
use whisper_core::canon::canonical_json_string;
use whisper_core::marker::{self, Marker};

/// Separator between path segments. Changing it changes the prompt format.
pub const PATH_SEPARATOR: char = '.';

/// Version of the dot-path format handed to the model.
pub const PATH_FORMAT_VERSION: u32 = 1;

/// Single-level view of a tree, keyed by dot-joined path.
pub type FlatMap = BTreeMap<String, Value>;

/// Flatten a tree into dot-joined paths.
///
/// Maps are expanded; sequences and scalars are kept whole as leaves.
/// `null` yields an empty map. A non-map root lands under `prefix`
/// (the empty path when no prefix is given).
pub fn flatten(tree: &Value, prefix: &str) -> FlatMap {
    let mut out = FlatMap::new();
    if !tree.is_null() {
        flatten_into(tree, prefix, &mut out);
    }
    out
}

fn flatten_into(node: &Value, path: &str, out: &mut FlatMap) {
    if let Some(Marker::CircularRef(target)) = marker::classify(node) {
        out.insert(
            path.to_string(),
            Value::String(marker::circular_placeholder(target)),
        );
        return;
    }
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(child, &join_path(path, key), out);
            }
        }
        leaf => {
            out.insert(path.to_string(), leaf.clone());
        }
    }
}

/// Append `key` to `prefix` with [`PATH_SEPARATOR`].
pub fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}{PATH_SEPARATOR}{key}")
    }
}

pub fn flat_map_to_value(flat: &FlatMap) -> Value {
    Value::Object(flat.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
}

/// Stable JSON text of a flat map (keys sorted).
pub fn serialize_flat_map(flat: &FlatMap) -> String {
    canonical_json_string(&flat_map_to_value(flat))
}
