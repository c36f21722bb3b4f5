/// Misuse of the summarization API. Data problems inside the log are
/// never reported here; they degrade to placeholder output instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SummaryError {
    #[error("resume index {index} is beyond the log length {len}")]
    InvalidResumePoint { index: usize, len: usize },
    #[error("resume index must not be negative (got {0})")]
    NegativeResumeIndex(i64),
}
