use anyhow::Context;
use std::path::Path;
use whisper_core::{ChatTurn, RecordedLog};
use whisper_diff::flatten;
use whisper_prompt::{build_prompt, PromptInput, PromptOptions};
use whisper_summary::summarize;

/// `whisper prompt <log>`
pub fn execute(
    log_path: &Path,
    history_path: Option<&Path>,
    omit_state: bool,
    budget: Option<usize>,
) -> anyhow::Result<()> {
    print!("{}", render(log_path, history_path, omit_state, budget)?);
    Ok(())
}

fn render(
    log_path: &Path,
    history_path: Option<&Path>,
    omit_state: bool,
    budget: Option<usize>,
) -> anyhow::Result<String> {
    let log = RecordedLog::load(log_path)?;
    let history = match history_path {
        Some(path) => read_history(path)?,
        None => Vec::new(),
    };

    let mut options = PromptOptions::from_env();
    if let Some(budget) = budget {
        if budget == 0 {
            anyhow::bail!("--budget must be greater than zero");
        }
        options.budget_chars = budget;
    }

    let summary = summarize(&log, None)?;
    let current = if omit_state {
        None
    } else {
        log.current().map(|state| flatten(state, ""))
    };

    Ok(build_prompt(
        &PromptInput {
            current_state: current.as_ref(),
            entries: &summary.entries,
            history: &history,
        },
        &options,
    ))
}

fn read_history(path: &Path) -> anyhow::Result<Vec<ChatTurn>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read history {}", path.display()))?;
    let turns: Vec<ChatTurn> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a list of chat turns", path.display()))?;
    Ok(turns)
}
