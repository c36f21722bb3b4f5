use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use whisper_core::{ChangeLogEntry, ChatTurn, SessionId};
use whisper_diff::FlatMap;

use crate::config::ChatOptions;
use crate::prompt::{build_prompt, PromptInput, PromptOptions};
use crate::provider::{CompletionProvider, ProviderError};

/// Dialogue turns per recorder session, oldest first. In memory only.
#[derive(Debug, Default)]
pub struct ConversationStore {
    sessions: HashMap<SessionId, Vec<ChatTurn>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self, session: &str) -> &[ChatTurn] {
        self.sessions
            .get(session)
            .map(|t| t.as_slice())
            .unwrap_or(&[])
    }

    pub fn push(&mut self, session: &str, turn: ChatTurn) {
        self.sessions
            .entry(session.to_string())
            .or_default()
            .push(turn);
    }

    pub fn clear(&mut self, session: &str) {
        self.sessions.remove(session);
    }
}

/// Summarized material a question is asked against. Never mutated once built.
#[derive(Debug, Clone)]
pub struct ChatContext {
    pub entries: Arc<[ChangeLogEntry]>,
    pub current_state: Option<Arc<FlatMap>>,
    pub prompt: PromptOptions,
}

/// Ask the model a question about the active session.
///
/// Blank questions are ignored (`Ok(None)`). The user turn is recorded
/// before the provider is called and stays recorded if the call fails;
/// the model turn is recorded only on success.
pub async fn ask(
    store: &mut ConversationStore,
    session: &str,
    provider: &dyn CompletionProvider,
    question: &str,
    context: &ChatContext,
    options: &ChatOptions,
) -> Result<Option<String>, ProviderError> {
    let question = question.trim();
    if question.is_empty() {
        return Ok(None);
    }

    let prompt = build_prompt(
        &PromptInput {
            current_state: context.current_state.as_deref(),
            entries: &context.entries,
            history: store.turns(session),
        },
        &context.prompt,
    );
    store.push(session, ChatTurn::user(question));

    debug!(
        session,
        provider = %provider.kind(),
        prompt_chars = prompt.len(),
        "asking provider"
    );
    let history = store.turns(session).to_vec();
    let answer = match tokio::time::timeout(options.timeout, provider.complete(&prompt, &history)).await {
        Ok(Ok(answer)) => answer,
        Ok(Err(err)) => {
            warn!(session, error = %err, "provider call failed");
            return Err(err);
        }
        Err(_) => {
            warn!(session, timeout = ?options.timeout, "provider call timed out");
            return Err(ProviderError::Timeout(options.timeout));
        }
    };

    store.push(session, ChatTurn::model(answer.clone()));
    Ok(Some(answer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ProviderKind, ScriptedProvider};
    use serde_json::json;
    use std::time::Duration;
    use whisper_core::{RecordedLog, Sender};
    use whisper_diff::flatten;

    fn context_for(log: &RecordedLog, entries: Vec<ChangeLogEntry>) -> ChatContext {
        ChatContext {
            entries: Arc::from(entries),
            current_state: log.current().map(|s| Arc::new(flatten(s, ""))),
            prompt: PromptOptions::default(),
        }
    }

    fn sample_context() -> ChatContext {
        let mut log = RecordedLog::new();
        log.push("ADD_ITEM", 1, json!({"cart": {"items": ["apple"]}}));
        let entries = vec![ChangeLogEntry {
            step: 0,
            action_descriptor: log.action(0).unwrap().descriptor(),
            diff_text: r#"{"cart.items":["apple"]}"#.to_string(),
        }];
        context_for(&log, entries)
    }

    #[test]
    fn store_keeps_sessions_apart() {
        let mut store = ConversationStore::new();
        store.push("a", ChatTurn::user("hi"));
        store.push("b", ChatTurn::user("yo"));
        store.push("a", ChatTurn::model("hello"));
        assert_eq!(store.turns("a").len(), 2);
        assert_eq!(store.turns("b"), &[ChatTurn::user("yo")]);
        assert!(store.turns("c").is_empty());
        store.clear("a");
        assert!(store.turns("a").is_empty());
    }

    #[tokio::test]
    async fn ask_records_both_turns() {
        let provider = ScriptedProvider::new(ProviderKind::OpenAi).answer("ADD_ITEM added apple");
        let mut store = ConversationStore::new();
        let answer = ask(
            &mut store,
            "s1",
            &provider,
            "what was added?",
            &sample_context(),
            &ChatOptions::default(),
        )
        .await
        .unwrap();
        assert_eq!(answer.as_deref(), Some("ADD_ITEM added apple"));
        let turns = store.turns("s1");
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].sender, Sender::User);
        assert_eq!(turns[1], ChatTurn::model("ADD_ITEM added apple"));

        let prompts = provider.prompts();
        assert!(prompts[0].contains("cart.items"));
        assert!(prompts[0].contains("ADD_ITEM"));
    }

    #[tokio::test]
    async fn second_question_sees_earlier_turns() {
        let provider = ScriptedProvider::new(ProviderKind::OpenAi)
            .answer("first answer")
            .answer("second answer");
        let mut store = ConversationStore::new();
        let ctx = sample_context();
        let opts = ChatOptions::default();
        ask(&mut store, "s1", &provider, "one?", &ctx, &opts).await.unwrap();
        ask(&mut store, "s1", &provider, "two?", &ctx, &opts).await.unwrap();
        let prompts = provider.prompts();
        assert!(!prompts[0].contains("### Conversation"));
        assert!(prompts[1].contains("user: one?"));
        assert!(prompts[1].contains("model: first answer"));
        assert_eq!(store.turns("s1").len(), 4);
    }

    #[tokio::test]
    async fn blank_question_is_ignored() {
        let provider = ScriptedProvider::new(ProviderKind::OpenAi);
        let mut store = ConversationStore::new();
        let answer = ask(
            &mut store,
            "s1",
            &provider,
            "   ",
            &sample_context(),
            &ChatOptions::default(),
        )
        .await
        .unwrap();
        assert!(answer.is_none());
        assert!(store.turns("s1").is_empty());
        assert!(provider.prompts().is_empty());
    }

    #[tokio::test]
    async fn failed_call_keeps_only_user_turn() {
        let provider = ScriptedProvider::new(ProviderKind::Cohere).fail("quota exceeded");
        let mut store = ConversationStore::new();
        let err = ask(
            &mut store,
            "s1",
            &provider,
            "why?",
            &sample_context(),
            &ChatOptions::default(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "quota exceeded");
        assert_eq!(store.turns("s1"), &[ChatTurn::user("why?")]);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out() {
        let provider = ScriptedProvider::new(ProviderKind::XAi)
            .answer("late")
            .with_delay(Duration::from_secs(30));
        let mut store = ConversationStore::new();
        let opts = ChatOptions {
            timeout: Duration::from_secs(5),
        };
        let err = ask(&mut store, "s1", &provider, "q", &sample_context(), &opts)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(d) if d == Duration::from_secs(5)));
        assert_eq!(store.turns("s1").len(), 1);
    }
}
