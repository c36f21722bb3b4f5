use serde_json::{Map, Value};
use std::collections::BTreeMap;
use whisper_core::marker;

/// Structural difference between two snapshots.
///
/// Leaves carry the old and/or new value; `Nested` mirrors a map node.
/// Paths that did not change have no entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Delta {
    Added(Value),
    Changed { old: Value, new: Value },
    Removed(Value),
    Nested(BTreeMap<String, Delta>),
    /// Leaf shape outside the known variants (only produced by [`crate::compat`]).
    Unrecognized(Value),
}

impl Delta {
    /// True for a map node with no changed children.
    pub fn is_empty(&self) -> bool {
        matches!(self, Delta::Nested(children) if children.is_empty())
    }

    /// Number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Delta::Nested(children) => children.values().map(Delta::leaf_count).sum(),
            _ => 1,
        }
    }
}

/// Compare two snapshots. Returns `None` when they are structurally equal.
///
/// Maps are compared key by key; sequences, scalars and recorder markers
/// (circular references, executable values) as whole values.
pub fn compute_delta(previous: &Value, current: &Value) -> Option<Delta> {
    let is_leaf = |v: &Value| marker::classify(v).is_some();
    match (previous, current) {
        (Value::Object(prev), Value::Object(curr)) if !is_leaf(previous) && !is_leaf(current) => {
            let children = diff_maps(prev, curr);
            if children.is_empty() {
                None
            } else {
                Some(Delta::Nested(children))
            }
        }
        _ if previous == current => None,
        _ => Some(Delta::Changed {
            old: previous.clone(),
            new: current.clone(),
        }),
    }
}

fn diff_maps(prev: &Map<String, Value>, curr: &Map<String, Value>) -> BTreeMap<String, Delta> {
    let mut out = BTreeMap::new();
    for (key, old) in prev {
        match curr.get(key) {
            Some(new) => {
                if let Some(child) = compute_delta(old, new) {
                    out.insert(key.clone(), child);
                }
            }
            None => {
                out.insert(key.clone(), Delta::Removed(old.clone()));
            }
        }
    }
    for (key, new) in curr {
        if !prev.contains_key(key) {
            out.insert(key.clone(), Delta::Added(new.clone()));
        }
    }
    out
}
