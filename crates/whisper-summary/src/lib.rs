mod assemble;
mod cursor;
mod error;
mod session;

pub use assemble::{summarize, Anomaly, Summary};
pub use cursor::{ResumeCursor, ResumePoint};
pub use error::SummaryError;
pub use session::SessionSummaries;
