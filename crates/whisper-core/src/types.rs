use serde::{Deserialize, Serialize};

/// Full application state recorded at one step of the log.
pub type Snapshot = serde_json::Value;

/// Session (store instance) identifier, as reported by the recorder.
pub type SessionId = String;

/// Diff text used when a step holds values that cannot be rendered.
pub const UNSUMMARIZABLE_PLACEHOLDER: &str = "value could not be summarized";

/// The action dispatched to produce a step's snapshot.
///
/// `sequence_id` is the step index in the recorded log; it serializes as `id`
/// so the descriptor handed to the model reads `{"id":..,"timestamp":..,"type":..}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: String,
    pub timestamp: i64,
    #[serde(rename = "id", default)]
    pub sequence_id: u64,
}

impl Action {
    pub fn new(action_type: impl Into<String>, timestamp: i64, sequence_id: u64) -> Self {
        Self {
            action_type: action_type.into(),
            timestamp,
            sequence_id,
        }
    }

    /// Serialized `{type, timestamp, id}` descriptor (keys in canonical order).
    pub fn descriptor(&self) -> String {
        let value = serde_json::json!({
            "type": self.action_type,
            "timestamp": self.timestamp,
            "id": self.sequence_id,
        });
        crate::canon::canonical_json_string(&value)
    }
}

/// One unit of the change narrative: an action and what it did to the state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLogEntry {
    /// Log index the entry was produced from. Not part of the prompt format.
    #[serde(skip)]
    pub step: usize,
    pub action_descriptor: String,
    pub diff_text: String,
}

/// Who wrote a dialogue turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Model,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Model => "model",
        }
    }
}

/// A single dialogue turn between the developer and the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub sender: Sender,
    pub message: String,
}

impl ChatTurn {
    pub fn user(message: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            message: message.into(),
        }
    }

    pub fn model(message: impl Into<String>) -> Self {
        Self {
            sender: Sender::Model,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_has_type_timestamp_and_id() {
        let action = Action::new("ADD_TODO", 1700000000123, 4);
        assert_eq!(
            action.descriptor(),
            r#"{"id":4,"timestamp":1700000000123,"type":"ADD_TODO"}"#
        );
    }

    #[test]
    fn entry_serializes_camel_case_without_step() {
        let entry = ChangeLogEntry {
            step: 3,
            action_descriptor: "{}".to_string(),
            diff_text: "{\"a\":1}".to_string(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["actionDescriptor"], "{}");
        assert_eq!(json["diffText"], "{\"a\":1}");
        assert!(json.get("step").is_none());
    }

    #[test]
    fn chat_turn_sender_is_lowercase() {
        let turn = ChatTurn::model("hi");
        let json = serde_json::to_string(&turn).unwrap();
        assert_eq!(json, r#"{"sender":"model","message":"hi"}"#);
        let back: ChatTurn = serde_json::from_str(r#"{"sender":"user","message":"q"}"#).unwrap();
        assert_eq!(back, ChatTurn::user("q"));
    }
}
