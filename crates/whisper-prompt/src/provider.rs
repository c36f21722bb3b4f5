//! # Provider capability
//!
//! The one thing the chat path needs from a language model: turn a prompt
//! and the dialogue so far into an answer. Which backend sits behind it is
//! decided once, when [`crate::AiConfig::resolve`] produces a
//! [`ResolvedProvider`]; nothing downstream inspects concrete types.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use whisper_core::ChatTurn;

/// Errors that can occur while asking a provider for an answer.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The call did not finish within the configured timeout.
    #[error("completion timed out after {0:?}")]
    Timeout(Duration),

    /// The provider answered with no text.
    #[error("provider returned an empty answer")]
    EmptyAnswer,

    /// Provider-specific failure.
    #[error("{message}")]
    Other {
        /// Error description.
        message: String,
    },
}

/// Closed set of supported model vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "OpenAI")]
    OpenAi,
    #[serde(rename = "xAI")]
    XAi,
    #[serde(rename = "Cohere")]
    Cohere,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [ProviderKind::XAi, ProviderKind::OpenAi, ProviderKind::Cohere];

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::XAi => "xAI",
            ProviderKind::Cohere => "Cohere",
        }
    }

    /// Models offered for this provider.
    pub fn models(&self) -> &'static [&'static str] {
        match self {
            ProviderKind::OpenAi => &["gpt-4o", "gpt-4o-mini"],
            ProviderKind::XAi => &["grok-2-1212"],
            ProviderKind::Cohere => &["command-r-plus"],
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::XAi => "https://api.x.ai/v1",
            ProviderKind::Cohere => "https://api.cohere.com/v2",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ProviderKind::ALL
            .into_iter()
            .find(|k| k.display_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| wanted.to_string())
    }
}

/// A validated provider selection, ready for a transport to be built from.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedProvider {
    pub kind: ProviderKind,
    pub model: String,
    pub base_url: String,
    pub api_key: String,
}

impl fmt::Debug for ResolvedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedProvider")
            .field("kind", &self.kind)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Core completion capability.
///
/// Implementors must be `Send + Sync` so a provider can be shared with the
/// task that awaits the answer.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider identifier.
    fn kind(&self) -> ProviderKind;

    /// Answer the last user turn in `history`, given the system `prompt`.
    async fn complete(&self, prompt: &str, history: &[ChatTurn]) -> Result<String, ProviderError>;
}

/// Provider returning canned answers in order. For tests and dry runs.
pub struct ScriptedProvider {
    kind: ProviderKind,
    answers: Mutex<VecDeque<Result<String, ProviderError>>>,
    delay: Option<Duration>,
    seen_prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            answers: Mutex::new(VecDeque::new()),
            delay: None,
            seen_prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn answer(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()))
    }

    pub fn fail(self, message: impl Into<String>) -> Self {
        self.push(Err(ProviderError::Other {
            message: message.into(),
        }))
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn push(self, answer: Result<String, ProviderError>) -> Self {
        if let Ok(mut answers) = self.answers.lock() {
            answers.push_back(answer);
        }
        self
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.seen_prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn complete(&self, prompt: &str, _history: &[ChatTurn]) -> Result<String, ProviderError> {
        if let Ok(mut seen) = self.seen_prompts.lock() {
            seen.push(prompt.to_string());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self
            .answers
            .lock()
            .ok()
            .and_then(|mut answers| answers.pop_front());
        match next {
            Some(Ok(text)) if text.trim().is_empty() => Err(ProviderError::EmptyAnswer),
            Some(answer) => answer,
            None => Err(ProviderError::EmptyAnswer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_parses_display_names() {
        assert_eq!("OpenAI".parse::<ProviderKind>(), Ok(ProviderKind::OpenAi));
        assert_eq!("xai".parse::<ProviderKind>(), Ok(ProviderKind::XAi));
        assert_eq!(" Cohere ".parse::<ProviderKind>(), Ok(ProviderKind::Cohere));
        assert_eq!("Ollama".parse::<ProviderKind>(), Err("Ollama".to_string()));
    }

    #[test]
    fn provider_kind_serde_uses_display_names() {
        let json = serde_json::to_string(&ProviderKind::XAi).unwrap();
        assert_eq!(json, r#""xAI""#);
    }

    #[test]
    fn resolved_provider_debug_redacts_key() {
        let resolved = ResolvedProvider {
            kind: ProviderKind::OpenAi,
            model: "gpt-4o".to_string(),
            base_url: ProviderKind::OpenAi.default_base_url().to_string(),
            api_key: "sk-secret".to_string(),
        };
        let debug = format!("{resolved:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[tokio::test]
    async fn scripted_provider_answers_in_order() {
        let provider = ScriptedProvider::new(ProviderKind::Cohere)
            .answer("first")
            .fail("boom")
            .answer("  ");
        let history = [ChatTurn::user("q")];
        assert_eq!(provider.complete("p1", &history).await.unwrap(), "first");
        assert!(matches!(
            provider.complete("p2", &history).await,
            Err(ProviderError::Other { .. })
        ));
        assert!(matches!(
            provider.complete("p3", &history).await,
            Err(ProviderError::EmptyAnswer)
        ));
        assert_eq!(provider.prompts(), vec!["p1", "p2", "p3"]);
        assert_eq!(provider.kind(), ProviderKind::Cohere);
    }
}
