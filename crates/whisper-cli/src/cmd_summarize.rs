use anyhow::Context;
use std::path::Path;
use whisper_core::RecordedLog;
use whisper_summary::{summarize, ResumeCursor, ResumePoint, Summary};

/// `whisper summarize <log>`
pub fn execute(
    log_path: &Path,
    resume_index: Option<i64>,
    resume_ts: Option<i64>,
    cursor_path: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let summary = run(log_path, resume_index, resume_ts, cursor_path)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", format_human(&summary));
    }
    Ok(())
}

fn run(
    log_path: &Path,
    resume_index: Option<i64>,
    resume_ts: Option<i64>,
    cursor_path: Option<&Path>,
) -> anyhow::Result<Summary> {
    let log = RecordedLog::load(log_path)?;

    let resume = match (resume_index, resume_ts, cursor_path) {
        (Some(index), _, _) => Some(ResumePoint::from_signed(index)?),
        (None, Some(ts), _) => Some(ResumePoint::Timestamp(ts)),
        (None, None, Some(path)) => load_cursor(path, log.len())?.map(|c| c.resume_point()),
        (None, None, None) => None,
    };

    let summary = summarize(&log, resume)?;

    if let Some(path) = cursor_path {
        summary
            .cursor
            .save(path)
            .with_context(|| format!("saving cursor to {}", path.display()))?;
    }
    Ok(summary)
}

/// Saved cursor, dropped when the log no longer reaches it.
fn load_cursor(path: &Path, log_len: usize) -> anyhow::Result<Option<ResumeCursor>> {
    let Some(mut cursor) = ResumeCursor::load(path)
        .with_context(|| format!("reading cursor {}", path.display()))?
    else {
        return Ok(None);
    };
    if cursor.detect_truncation(log_len) {
        tracing::info!(path = %path.display(), "log is shorter than saved cursor, starting over");
    }
    Ok(Some(cursor))
}

fn format_human(summary: &Summary) -> String {
    if summary.entries.is_empty() {
        return "(no changes)\n".to_string();
    }
    let mut out = String::new();
    for entry in &summary.entries {
        out.push_str(&format!("[{}] {}\n", entry.step, entry.action_descriptor));
        out.push_str(&format!("    {}\n", entry.diff_text));
    }
    out
}
