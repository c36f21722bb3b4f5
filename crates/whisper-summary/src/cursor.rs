use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

use crate::error::SummaryError;

/// Where a summarization call starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResumePoint {
    /// Skip steps with a lower index.
    Index(usize),
    /// Skip steps whose action timestamp is lower.
    Timestamp(i64),
}

impl ResumePoint {
    /// Index resume point from caller-supplied signed input.
    pub fn from_signed(index: i64) -> Result<Self, SummaryError> {
        usize::try_from(index)
            .map(ResumePoint::Index)
            .map_err(|_| SummaryError::NegativeResumeIndex(index))
    }
}

/// Output cursor of a summarization call; feed it back to continue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeCursor {
    /// First index not yet summarized.
    pub next_index: usize,
    /// Timestamp of the last action seen, if any.
    pub last_timestamp: Option<i64>,
}

impl ResumeCursor {
    pub fn resume_point(&self) -> ResumePoint {
        ResumePoint::Index(self.next_index)
    }

    /// Check for truncation: if the log shrank below the cursor, reset to 0.
    /// Returns true when a reset happened.
    pub fn detect_truncation(&mut self, log_len: usize) -> bool {
        if log_len < self.next_index {
            *self = ResumeCursor::default();
            return true;
        }
        false
    }

    pub fn load(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        let cursor: Self = serde_json::from_str(&content)?;
        Ok(Some(cursor))
    }

    /// Atomic write: temp file in the same dir, then rename.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)?;
        let data = serde_json::to_string_pretty(self)?;
        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(data.as_bytes())?;
        tmp.flush()?;
        tmp.persist(path)?;
        Ok(())
    }
}
