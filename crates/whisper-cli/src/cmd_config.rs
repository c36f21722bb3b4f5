use clap::Subcommand;
use whisper_prompt::{AiConfig, ChatOptions, ProviderKind};

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Validate the provider settings read from WHISPER_AI_* variables
    Check,
    /// List providers and the models each offers
    Providers,
}

pub fn run(cmd: ConfigCmd) -> anyhow::Result<()> {
    match cmd {
        ConfigCmd::Check => check(),
        ConfigCmd::Providers => {
            print!("{}", format_providers());
            Ok(())
        }
    }
}

/// `whisper config check`
fn check() -> anyhow::Result<()> {
    let config = AiConfig::from_env()?;
    match config.resolve() {
        Ok(resolved) => {
            println!("provider = {}", resolved.kind);
            println!("model    = {}", resolved.model);
            println!("base_url = {}", resolved.base_url);
            println!("api_key  = (set)");
            println!("timeout  = {}s", ChatOptions::from_env().timeout.as_secs());
            Ok(())
        }
        Err(e) => anyhow::bail!("AI configuration incomplete: {e}"),
    }
}

fn format_providers() -> String {
    let mut out = String::new();
    for kind in ProviderKind::ALL {
        out.push_str(&format!(
            "{kind}: {} ({})\n",
            kind.models().join(", "),
            kind.default_base_url()
        ));
    }
    out
}
