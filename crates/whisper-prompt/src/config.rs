use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::provider::{ProviderKind, ResolvedProvider};

const DEFAULT_PROMPT_TIMEOUT_SECS: u64 = 60;

/// Why an AI configuration cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("select a provider")]
    MissingProvider,
    #[error("select a model name")]
    MissingModel,
    #[error("insert an API key")]
    MissingApiKey,
    #[error("unknown provider `{0}`")]
    UnknownProvider(String),
    #[error("model `{model}` is not offered by {provider}")]
    UnsupportedModel { provider: ProviderKind, model: String },
}

/// Model selection as entered by the developer. Held in memory only.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
    #[serde(default)]
    pub provider: Option<ProviderKind>,
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "<redacted>" })
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl AiConfig {
    /// Read `WHISPER_AI_PROVIDER`, `WHISPER_AI_MODEL`, `WHISPER_AI_API_KEY`
    /// and `WHISPER_AI_BASE_URL`. Unset variables stay empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let provider = non_empty("WHISPER_AI_PROVIDER")
            .map(|p| p.parse::<ProviderKind>().map_err(ConfigError::UnknownProvider))
            .transpose()?;
        Ok(Self {
            provider,
            model: non_empty("WHISPER_AI_MODEL").unwrap_or_default(),
            api_key: non_empty("WHISPER_AI_API_KEY").unwrap_or_default(),
            base_url: non_empty("WHISPER_AI_BASE_URL"),
        })
    }

    /// Forget everything, including the key.
    pub fn clear(&mut self) {
        *self = AiConfig::default();
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resolve().map(|_| ())
    }

    /// Fix the provider choice once, for the lifetime of a chat.
    pub fn resolve(&self) -> Result<ResolvedProvider, ConfigError> {
        let kind = self.provider.ok_or(ConfigError::MissingProvider)?;
        let model = self.model.trim();
        if model.is_empty() {
            return Err(ConfigError::MissingModel);
        }
        if !kind.models().contains(&model) {
            return Err(ConfigError::UnsupportedModel {
                provider: kind,
                model: model.to_string(),
            });
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(ResolvedProvider {
            kind,
            model: model.to_string(),
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| kind.default_base_url().to_string()),
            api_key: self.api_key.clone(),
        })
    }
}

/// Knobs for the asynchronous chat stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatOptions {
    pub timeout: Duration,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_PROMPT_TIMEOUT_SECS),
        }
    }
}

impl ChatOptions {
    /// Read `WHISPER_PROMPT_TIMEOUT_SECS`, falling back to the default.
    pub fn from_env() -> Self {
        let secs = std::env::var("WHISPER_PROMPT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PROMPT_TIMEOUT_SECS);
        Self {
            timeout: Duration::from_secs(secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn complete_config() -> AiConfig {
        AiConfig {
            provider: Some(ProviderKind::XAi),
            model: "grok-2-1212".to_string(),
            api_key: "xai-key".to_string(),
            base_url: None,
        }
    }

    #[test]
    fn resolve_fills_default_base_url() {
        let resolved = complete_config().resolve().unwrap();
        assert_eq!(resolved.kind, ProviderKind::XAi);
        assert_eq!(resolved.base_url, "https://api.x.ai/v1");
    }

    #[test]
    fn resolve_keeps_explicit_base_url() {
        let mut config = complete_config();
        config.base_url = Some("http://localhost:8080/v1".to_string());
        assert_eq!(
            config.resolve().unwrap().base_url,
            "http://localhost:8080/v1"
        );
    }

    #[test]
    fn validation_reports_first_missing_field() {
        let mut config = complete_config();
        config.api_key.clear();
        assert_eq!(config.validate(), Err(ConfigError::MissingApiKey));
        config.model = " ".to_string();
        assert_eq!(config.validate(), Err(ConfigError::MissingModel));
        config.provider = None;
        assert_eq!(config.validate(), Err(ConfigError::MissingProvider));
    }

    #[test]
    fn model_must_belong_to_provider() {
        let mut config = complete_config();
        config.model = "gpt-4o".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnsupportedModel {
                provider: ProviderKind::XAi,
                model: "gpt-4o".to_string()
            })
        );
    }

    #[test]
    fn clear_forgets_everything() {
        let mut config = complete_config();
        config.clear();
        assert_eq!(config, AiConfig::default());
    }

    #[test]
    fn from_lookup_reads_whisper_vars() {
        let config = AiConfig::from_lookup(lookup(&[
            ("WHISPER_AI_PROVIDER", "openai"),
            ("WHISPER_AI_MODEL", "gpt-4o-mini"),
            ("WHISPER_AI_API_KEY", "sk-1"),
            ("WHISPER_AI_BASE_URL", ""),
        ]))
        .unwrap();
        assert_eq!(config.provider, Some(ProviderKind::OpenAi));
        assert_eq!(config.base_url, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn from_lookup_rejects_unknown_provider() {
        let err = AiConfig::from_lookup(lookup(&[("WHISPER_AI_PROVIDER", "Ollama")])).unwrap_err();
        assert_eq!(err, ConfigError::UnknownProvider("Ollama".to_string()));
    }

    #[test]
    fn api_key_is_never_serialized_or_printed() {
        let config = complete_config();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("xai-key"));
        assert!(!format!("{config:?}").contains("xai-key"));
    }
}
