use serde_json::Value;
use std::collections::BTreeMap;
use whisper_core::canon::render_value;

use crate::delta::Delta;

/// Prefix for leaves whose change shape could not be interpreted.
pub const UNRECOGNIZED_MARKER: &str = "[UNRECOGNIZED CHANGE]";

/// A [`Delta`] with every leaf rendered as a sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescribedDelta {
    Text(String),
    Nested(BTreeMap<String, DescribedDelta>),
}

impl DescribedDelta {
    /// JSON tree form, suitable for [`crate::flatten`].
    pub fn to_value(&self) -> Value {
        match self {
            DescribedDelta::Text(text) => Value::String(text.clone()),
            DescribedDelta::Nested(children) => Value::Object(
                children
                    .iter()
                    .map(|(k, child)| (k.clone(), child.to_value()))
                    .collect(),
            ),
        }
    }
}

/// Render a delta as human-readable change descriptions, keeping its shape.
pub fn describe(delta: &Delta) -> DescribedDelta {
    match delta {
        Delta::Added(new) => {
            DescribedDelta::Text(format!("A NEW VALUE WAS ADDED: {}", render_value(new)))
        }
        Delta::Changed { old, new } => DescribedDelta::Text(format!(
            "THIS VALUE: {} WAS CHANGED TO: {}",
            render_value(old),
            render_value(new)
        )),
        Delta::Removed(old) => {
            DescribedDelta::Text(format!("THIS VALUE {} WAS DELETED", render_value(old)))
        }
        Delta::Unrecognized(raw) => {
            DescribedDelta::Text(format!("{UNRECOGNIZED_MARKER} {}", render_value(raw)))
        }
        Delta::Nested(children) => DescribedDelta::Nested(
            children
                .iter()
                .map(|(k, child)| (k.clone(), describe(child)))
                .collect(),
        ),
    }
}
