use serde_json::Value;

/// Produce canonical JSON text: object keys sorted lexicographically (recursive),
/// arrays preserve order, no extra whitespace.
///
/// Prompt text and diff text go through here so the model sees the same
/// bytes for the same state regardless of map iteration order.
pub fn canonical_json_string(value: &Value) -> String {
    sort_value(value).to_string()
}

/// Compact rendering of a single value for change descriptions.
/// Strings keep their quotes (`"x"`), numbers and literals render bare,
/// circular references render as their placeholder.
pub fn render_value(value: &Value) -> String {
    canonical_json_string(&crate::marker::replace_circular(value))
}

fn sort_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut pairs: Vec<(&String, Value)> =
                map.iter().map(|(k, v)| (k, sort_value(v))).collect();
            pairs.sort_by(|a, b| a.0.cmp(b.0));
            let sorted_map: serde_json::Map<String, Value> =
                pairs.into_iter().map(|(k, v)| (k.clone(), v)).collect();
            Value::Object(sorted_map)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_value).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_sorted_lexicographically() {
        let input: Value = serde_json::from_str(r#"{"z":1,"a":2,"m":3}"#).unwrap();
        assert_eq!(canonical_json_string(&input), r#"{"a":2,"m":3,"z":1}"#);
    }

    #[test]
    fn nested_objects_sorted_arrays_kept() {
        let input = json!({"b": {"z": 1, "a": [3, 1, 2]}, "a": 1});
        assert_eq!(
            canonical_json_string(&input),
            r#"{"a":1,"b":{"a":[3,1,2],"z":1}}"#
        );
    }

    #[test]
    fn render_value_quotes_strings_only() {
        assert_eq!(render_value(&json!(2)), "2");
        assert_eq!(render_value(&json!("done")), r#""done""#);
        assert_eq!(render_value(&json!(null)), "null");
        assert_eq!(render_value(&json!(true)), "true");
    }

    #[test]
    fn render_value_replaces_circular_references() {
        assert_eq!(
            render_value(&json!({"parent": {"$jsan": "$"}})),
            r#"{"parent":"[circular reference to $]"}"#
        );
    }
}
