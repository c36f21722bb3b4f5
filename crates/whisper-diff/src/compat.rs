//! Interop with the jsondiffpatch delta encoding.
//!
//! jsondiffpatch encodes leaves by array arity: `[new]` added,
//! `[old, new]` changed, `[old, 0, 0]` deleted, and tags array deltas with a
//! `"_t"` bookkeeping key. Deltas recorded in that format are converted to
//! [`Delta`] here; anything outside the three arities becomes
//! [`Delta::Unrecognized`] instead of an error.

use serde_json::{json, Value};
use tracing::warn;

use crate::delta::Delta;

/// Keys used by the encoding itself rather than application data.
const BOOKKEEPING_KEYS: &[&str] = &["_t"];

/// Convert a jsondiffpatch delta into a [`Delta`] tree.
pub fn from_jsondiffpatch(encoded: &Value) -> Delta {
    from_encoded(encoded, "")
}

fn from_encoded(encoded: &Value, path: &str) -> Delta {
    match encoded {
        Value::Object(map) => Delta::Nested(
            map.iter()
                .filter(|(k, _)| !BOOKKEEPING_KEYS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), from_encoded(v, &crate::join_path(path, k))))
                .collect(),
        ),
        Value::Array(items) => match items.as_slice() {
            [new] => Delta::Added(new.clone()),
            [old, new] => Delta::Changed {
                old: old.clone(),
                new: new.clone(),
            },
            [old, _, _] => Delta::Removed(old.clone()),
            _ => unrecognized(encoded, path),
        },
        _ => unrecognized(encoded, path),
    }
}

fn unrecognized(encoded: &Value, path: &str) -> Delta {
    warn!(path, shape = %encoded, "unrecognized delta shape");
    Delta::Unrecognized(encoded.clone())
}

/// Encode a [`Delta`] in jsondiffpatch form.
///
/// `Unrecognized` leaves are written back verbatim.
pub fn to_jsondiffpatch(delta: &Delta) -> Value {
    match delta {
        Delta::Added(new) => json!([new]),
        Delta::Changed { old, new } => json!([old, new]),
        Delta::Removed(old) => json!([old, 0, 0]),
        Delta::Unrecognized(raw) => raw.clone(),
        Delta::Nested(children) => Value::Object(
            children
                .iter()
                .map(|(k, child)| (k.clone(), to_jsondiffpatch(child)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compute_delta, describe, flatten};

    #[test]
    fn arity_encoding_maps_to_variants() {
        let encoded = json!({
            "added": [5],
            "changed": [1, 2],
            "deleted": ["x", 0, 0],
            "list": {"_t": "a", "0": [9]}
        });
        let delta = from_jsondiffpatch(&encoded);
        let Delta::Nested(children) = &delta else {
            panic!("expected nested delta");
        };
        assert_eq!(children["added"], Delta::Added(json!(5)));
        assert_eq!(
            children["changed"],
            Delta::Changed {
                old: json!(1),
                new: json!(2)
            }
        );
        assert_eq!(children["deleted"], Delta::Removed(json!("x")));
        let Delta::Nested(list) = &children["list"] else {
            panic!("expected nested list delta");
        };
        assert!(!list.contains_key("_t"));
        assert_eq!(list["0"], Delta::Added(json!(9)));
    }

    #[test]
    fn unknown_arity_is_flagged_not_fatal() {
        let delta = from_jsondiffpatch(&json!({"weird": [1, 2, 3, 4], "empty": [], "n": 7}));
        let flat = flatten(&describe(&delta).to_value(), "");
        assert_eq!(flat["weird"], json!("[UNRECOGNIZED CHANGE] [1,2,3,4]"));
        assert_eq!(flat["empty"], json!("[UNRECOGNIZED CHANGE] []"));
        assert_eq!(flat["n"], json!("[UNRECOGNIZED CHANGE] 7"));
    }

    #[test]
    fn encode_then_decode_matches_computed_delta() {
        let delta = compute_delta(
            &json!({"a": {"b": 1}, "gone": true}),
            &json!({"a": {"b": 2}, "new": [1]}),
        )
        .unwrap();
        let encoded = to_jsondiffpatch(&delta);
        assert_eq!(
            encoded,
            json!({"a": {"b": [1, 2]}, "gone": [true, 0, 0], "new": [[1]]})
        );
        assert_eq!(from_jsondiffpatch(&encoded), delta);
    }
}
