use whisper_core::{ChangeLogEntry, ChatTurn};
use whisper_diff::{serialize_flat_map, FlatMap, PATH_FORMAT_VERSION};

const DEFAULT_PROMPT_BUDGET_CHARS: usize = 24000;

/// Marker used in place of the current state when the caller leaves it out.
pub const OMITTED_STATE: &str = "[omitted]";

/// Everything the prompt is built from. All plain data.
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    /// Flattened current snapshot, or `None` to omit it.
    pub current_state: Option<&'a FlatMap>,
    pub entries: &'a [ChangeLogEntry],
    /// Earlier dialogue turns, oldest first.
    pub history: &'a [ChatTurn],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptOptions {
    /// Character budget for the change log section. Oldest entries are
    /// dropped first when it is exceeded.
    pub budget_chars: usize,
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self {
            budget_chars: DEFAULT_PROMPT_BUDGET_CHARS,
        }
    }
}

impl PromptOptions {
    /// Read `WHISPER_PROMPT_BUDGET_CHARS`, falling back to the default.
    pub fn from_env() -> Self {
        let budget_chars = std::env::var("WHISPER_PROMPT_BUDGET_CHARS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(DEFAULT_PROMPT_BUDGET_CHARS);
        Self { budget_chars }
    }
}

/// Build the system prompt handed to the model.
pub fn build_prompt(input: &PromptInput<'_>, options: &PromptOptions) -> String {
    let mut out = String::new();
    out.push_str(
        "You are a debugging assistant for a Redux application.\n\
         Below is the log of dispatched actions and, for each one, how the store \
         state changed compared to the previous step. Use it to answer questions \
         about the store and its modifications.\n\n",
    );
    out.push_str(&format!(
        "State paths are dot-joined keys (format v{PATH_FORMAT_VERSION}); arrays are shown whole.\n\n"
    ));

    out.push_str("### Current State\n");
    match input.current_state {
        Some(flat) => out.push_str(&serialize_flat_map(flat)),
        None => out.push_str(OMITTED_STATE),
    }
    out.push_str("\n\n");

    out.push_str("### Actions and State Differences\n");
    out.push_str(&render_entries(input.entries, options.budget_chars));
    out.push('\n');

    out.push_str(
        "### Instructions for the Answer\n\
         1. Give the minimal answer that directly addresses the question.\n\
         2. Keep it clear and precise.\n\
         3. If several actions or changes are relevant, list them briefly.\n\
         4. If the log cannot answer the question, say so and name the information that is missing.\n\n\
         ### Example Output\n\
         - \"The action `REMOVE_ITEM` removed an item from the cart.\"\n\
         - \"The last change came from `UPDATE_USER`, which changed the user's name from 'John' to 'Jane'.\"\n",
    );

    if !input.history.is_empty() {
        out.push_str("\n### Conversation\n");
        for turn in input.history {
            out.push_str(&format!("{}: {}\n", turn.sender.as_str(), turn.message));
        }
    }

    out
}

/// One JSON object per line, newest entries kept when over budget.
fn render_entries(entries: &[ChangeLogEntry], budget_chars: usize) -> String {
    if entries.is_empty() {
        return "(no recorded changes)\n".to_string();
    }

    let lines: Vec<String> = entries
        .iter()
        .map(|e| {
            serde_json::json!({
                "action": e.action_descriptor,
                "jsonDiff": e.diff_text,
            })
            .to_string()
        })
        .collect();

    let mut used = 0;
    let mut first_kept = lines.len();
    for (i, line) in lines.iter().enumerate().rev() {
        if used + line.len() + 1 > budget_chars {
            break;
        }
        used += line.len() + 1;
        first_kept = i;
    }

    let mut out = String::new();
    if first_kept > 0 {
        out.push_str(&format!(
            "... ({first_kept} earlier steps truncated by budget)\n"
        ));
    }
    for line in &lines[first_kept..] {
        out.push_str(line);
        out.push('\n');
    }
    out
}
