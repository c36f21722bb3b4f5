use std::sync::Arc;
use tracing::{debug, info};
use whisper_core::{ChangeLogEntry, RecordedLog};

use crate::assemble::{summarize, Anomaly};
use crate::cursor::ResumeCursor;
use crate::error::SummaryError;

/// Change narrative for the active recorder session, kept up to date as
/// the log grows.
///
/// Each refresh only walks the steps past the cursor. Switching to another
/// session drops the cursor and the cached entries, so the first refresh
/// afterwards starts from that session's own step 0.
#[derive(Debug, Default)]
pub struct SessionSummaries {
    active: Option<String>,
    cursor: ResumeCursor,
    entries: Vec<ChangeLogEntry>,
    anomalies: Vec<Anomaly>,
}

impl SessionSummaries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_session(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn cursor(&self) -> ResumeCursor {
        self.cursor
    }

    /// Make `session_id` the active session. Returns true if it changed.
    pub fn switch_session(&mut self, session_id: &str) -> bool {
        if self.active.as_deref() == Some(session_id) {
            return false;
        }
        info!(
            from = self.active.as_deref().unwrap_or("-"),
            to = session_id,
            "switching summarized session"
        );
        self.active = Some(session_id.to_string());
        self.reset();
        true
    }

    fn reset(&mut self) {
        self.cursor = ResumeCursor::default();
        self.entries.clear();
        self.anomalies.clear();
    }

    /// Summarize whatever the active session's log gained since the last call.
    pub fn refresh(&mut self, log: &RecordedLog) -> Result<&[ChangeLogEntry], SummaryError> {
        if self.cursor.detect_truncation(log.len()) {
            info!(len = log.len(), "log shrank below cursor, summarizing from start");
            self.entries.clear();
            self.anomalies.clear();
        }
        let summary = summarize(log, Some(self.cursor.resume_point()))?;
        debug!(
            new_entries = summary.entries.len(),
            next_index = summary.cursor.next_index,
            "refreshed session summary"
        );
        self.entries.extend(summary.entries);
        self.anomalies.extend(summary.anomalies);
        self.cursor = summary.cursor;
        Ok(&self.entries)
    }

    pub fn entries(&self) -> &[ChangeLogEntry] {
        &self.entries
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    /// Immutable copy of the entries for the asynchronous prompt stage.
    pub fn shared_entries(&self) -> Arc<[ChangeLogEntry]> {
        Arc::from(self.entries.as_slice())
    }
}
