use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::types::{Action, Snapshot};

/// Append-only log of dispatched actions and the state each one produced.
///
/// Mirrors the recorder's layout: actions keyed by step index (possibly
/// sparse) and one computed state per step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedLog {
    #[serde(default)]
    actions_by_id: BTreeMap<usize, ActionRecord>,
    #[serde(default)]
    computed_states: Vec<ComputedState>,
}

/// One recorded step, borrowed from the log.
#[derive(Debug, Clone, Copy)]
pub struct Step<'a> {
    pub index: usize,
    pub action: Option<&'a Action>,
    pub snapshot: &'a Snapshot,
}

/// Recorder action entry. Lifted actions (`{"type":"PERFORM_ACTION","action":{"type":"X"}}`)
/// report the inner action type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RawActionRecord", into = "RawActionRecord")]
struct ActionRecord(Action);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawActionRecord {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action: Option<ActionBody>,
    #[serde(default)]
    timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ActionBody {
    #[serde(rename = "type")]
    kind: String,
}

impl From<RawActionRecord> for ActionRecord {
    fn from(raw: RawActionRecord) -> Self {
        let action_type = raw
            .action
            .map(|a| a.kind)
            .or(raw.kind)
            .unwrap_or_default();
        // sequence_id is filled from the map key once the log is loaded
        ActionRecord(Action::new(action_type, raw.timestamp, 0))
    }
}

impl From<ActionRecord> for RawActionRecord {
    fn from(record: ActionRecord) -> Self {
        RawActionRecord {
            kind: Some(record.0.action_type),
            action: None,
            timestamp: record.0.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ComputedState {
    state: Snapshot,
}

impl RecordedLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a recorder export.
    pub fn from_json_str(input: &str) -> anyhow::Result<Self> {
        let mut log: RecordedLog = serde_json::from_str(input)?;
        log.assign_sequence_ids();
        Ok(log)
    }

    /// Read a recorder export from disk.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read log {}: {e}", path.display()))?;
        Self::from_json_str(&content)
    }

    fn assign_sequence_ids(&mut self) {
        for (index, record) in self.actions_by_id.iter_mut() {
            record.0.sequence_id = *index as u64;
        }
    }

    /// Append a step with its action. Returns the new step's index.
    pub fn push(&mut self, action_type: impl Into<String>, timestamp: i64, snapshot: Snapshot) -> usize {
        let index = self.computed_states.len();
        self.actions_by_id.insert(
            index,
            ActionRecord(Action::new(action_type, timestamp, index as u64)),
        );
        self.computed_states.push(ComputedState { state: snapshot });
        index
    }

    /// Append a state the recorder has no action for.
    pub fn push_state(&mut self, snapshot: Snapshot) -> usize {
        let index = self.computed_states.len();
        self.computed_states.push(ComputedState { state: snapshot });
        index
    }

    pub fn len(&self) -> usize {
        self.computed_states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.computed_states.is_empty()
    }

    pub fn action(&self, index: usize) -> Option<&Action> {
        self.actions_by_id.get(&index).map(|r| &r.0)
    }

    pub fn snapshot(&self, index: usize) -> Option<&Snapshot> {
        self.computed_states.get(index).map(|c| &c.state)
    }

    /// Most recent snapshot, if any step was recorded.
    pub fn current(&self) -> Option<&Snapshot> {
        self.computed_states.last().map(|c| &c.state)
    }

    pub fn step(&self, index: usize) -> Option<Step<'_>> {
        let snapshot = self.snapshot(index)?;
        Some(Step {
            index,
            action: self.action(index),
            snapshot,
        })
    }

    pub fn steps(&self) -> impl Iterator<Item = Step<'_>> + '_ {
        (0..self.len()).filter_map(move |i| self.step(i))
    }
}
