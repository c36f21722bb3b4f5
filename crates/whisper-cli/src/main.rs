mod cmd_config;
mod cmd_prompt;
mod cmd_summarize;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cmd_config::ConfigCmd;

#[derive(Parser)]
#[command(
    name = "whisper",
    version,
    about = "Explain recorded Redux state changes to a language model"
)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the change log for an exported devtools session
    Summarize {
        /// Exported log (JSON with actionsById and computedStates)
        log: PathBuf,
        /// Start at this step index
        #[arg(long, conflicts_with = "resume_ts", allow_negative_numbers = true)]
        resume_index: Option<i64>,
        /// Skip steps whose action timestamp is lower
        #[arg(long)]
        resume_ts: Option<i64>,
        /// Cursor file: resume from it when present, then save the new cursor
        #[arg(long, conflicts_with_all = ["resume_index", "resume_ts"])]
        cursor: Option<PathBuf>,
        /// Output the whole summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the model prompt built from an exported session
    Prompt {
        /// Exported log (JSON with actionsById and computedStates)
        log: PathBuf,
        /// Earlier dialogue turns (JSON array of {sender, message})
        #[arg(long)]
        history: Option<PathBuf>,
        /// Leave the current state out of the prompt
        #[arg(long)]
        omit_state: bool,
        /// Character budget for the change log section
        #[arg(long)]
        budget: Option<usize>,
    },
    /// AI provider configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.cmd {
        Command::Summarize {
            log,
            resume_index,
            resume_ts,
            cursor,
            json,
        } => cmd_summarize::execute(&log, resume_index, resume_ts, cursor.as_deref(), json),
        Command::Prompt {
            log,
            history,
            omit_state,
            budget,
        } => cmd_prompt::execute(&log, history.as_deref(), omit_state, budget),
        Command::Config { cmd } => cmd_config::run(cmd),
    }
}

/// Human-readable logs on stderr so stdout stays machine-readable.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
