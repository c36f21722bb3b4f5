//! Turning a change log into model context, and talking to the model.
//!
//! The prompt builder is pure; only [`ask`] awaits anything.

mod config;
mod conversation;
mod prompt;
mod provider;

pub use config::{AiConfig, ChatOptions, ConfigError};
pub use conversation::{ask, ChatContext, ConversationStore};
pub use prompt::{build_prompt, PromptInput, PromptOptions, OMITTED_STATE};
pub use provider::{
    CompletionProvider, ProviderError, ProviderKind, ResolvedProvider, ScriptedProvider,
};
