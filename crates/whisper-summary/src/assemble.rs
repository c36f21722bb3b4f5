use serde::Serialize;
use tracing::{debug, warn};
use whisper_core::marker::{check_summarizable, check_summarizable_at, ValueError};
use whisper_core::{ChangeLogEntry, RecordedLog, UNSUMMARIZABLE_PLACEHOLDER};
use whisper_diff::{compute_delta, describe, flatten, join_path, serialize_flat_map, Delta};

use crate::cursor::{ResumeCursor, ResumePoint};
use crate::error::SummaryError;

/// Result of one summarization call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub entries: Vec<ChangeLogEntry>,
    /// Pass back as the resume point of the next call.
    pub cursor: ResumeCursor,
    /// Data problems that were degraded instead of failing the call.
    pub anomalies: Vec<Anomaly>,
}

/// A recoverable data problem met during the walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// The recorder has a state but no action for this index; step skipped.
    MissingActionRecord { index: usize },
    /// A snapshot at this step could not be rendered; placeholder emitted.
    NonSerializableValue { index: usize, reason: String },
}

/// Turn the recorded log into an ordered change narrative.
///
/// Step 0 contributes its flattened snapshot; every later step contributes
/// the described, flattened delta against the step before it. Steps with
/// nothing to say are omitted. Only an out-of-range resume index is an error.
pub fn summarize(
    log: &RecordedLog,
    resume: Option<ResumePoint>,
) -> Result<Summary, SummaryError> {
    let len = log.len();
    let (start, min_timestamp) = match resume {
        None => (0, None),
        Some(ResumePoint::Index(index)) if index > len => {
            return Err(SummaryError::InvalidResumePoint { index, len });
        }
        Some(ResumePoint::Index(index)) => (index, None),
        Some(ResumePoint::Timestamp(ts)) => (0, Some(ts)),
    };

    let mut summary = Summary {
        cursor: ResumeCursor {
            next_index: len,
            last_timestamp: min_timestamp,
        },
        ..Summary::default()
    };

    for index in start..len {
        let Some(action) = log.action(index) else {
            warn!(index, "no action recorded for step, skipping");
            summary
                .anomalies
                .push(Anomaly::MissingActionRecord { index });
            continue;
        };
        summary.cursor.last_timestamp = Some(action.timestamp);
        if min_timestamp.is_some_and(|min| action.timestamp < min) {
            continue;
        }

        let diff_text = match step_diff_text(log, index) {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!(index, action = %action.action_type, "step left state unchanged");
                continue;
            }
            Err(err) => {
                warn!(index, error = %err, "step could not be summarized");
                summary.anomalies.push(Anomaly::NonSerializableValue {
                    index,
                    reason: err.to_string(),
                });
                UNSUMMARIZABLE_PLACEHOLDER.to_string()
            }
        };

        summary.entries.push(ChangeLogEntry {
            step: index,
            action_descriptor: action.descriptor(),
            diff_text,
        });
    }

    debug!(
        from = start,
        to = len,
        entries = summary.entries.len(),
        "summarized log"
    );
    Ok(summary)
}

/// Diff text for one step, or `None` when the step changed nothing.
///
/// Step 0 must be summarizable as a whole. Later steps only fail on the
/// values their own change carries.
fn step_diff_text(log: &RecordedLog, index: usize) -> Result<Option<String>, ValueError> {
    let Some(current) = log.snapshot(index) else {
        return Ok(None);
    };

    let flat = if index == 0 {
        check_summarizable(current)?;
        flatten(current, "")
    } else {
        let Some(previous) = log.snapshot(index - 1) else {
            return Ok(None);
        };
        let Some(delta) = compute_delta(previous, current) else {
            return Ok(None);
        };
        check_delta(&delta, "", 0)?;
        debug!(index, changes = delta.leaf_count(), "computed step delta");
        flatten(&describe(&delta).to_value(), "")
    };

    if flat.is_empty() {
        Ok(None)
    } else {
        Ok(Some(serialize_flat_map(&flat)))
    }
}

fn check_delta(delta: &Delta, path: &str, depth: usize) -> Result<(), ValueError> {
    match delta {
        Delta::Nested(children) => {
            for (key, child) in children {
                check_delta(child, &join_path(path, key), depth + 1)?;
            }
            Ok(())
        }
        Delta::Added(value) | Delta::Removed(value) | Delta::Unrecognized(value) => {
            check_summarizable_at(value, path, depth)
        }
        Delta::Changed { old, new } => {
            check_summarizable_at(old, path, depth)?;
            check_summarizable_at(new, path, depth)
        }
    }
}
