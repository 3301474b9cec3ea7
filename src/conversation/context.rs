use super::store::ConversationStore;
use crate::config::ChatConfig;
use crate::llm::{ChatMessage, CompletionProvider};
use anyhow::Result;
use std::sync::Arc;

/// Per-exchange chat settings, read from the live config each time.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub system_prompt: String,
    pub context_size: usize,
    pub model: String,
    pub temperature: f64,
}

impl ChatSettings {
    pub fn from_config(config: &ChatConfig) -> Self {
        Self {
            system_prompt: config.system_prompt.clone(),
            context_size: config.context,
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }
}

/// Bounded prompt assembly around a stateless completion provider.
pub struct ContextBuilder {
    store: Arc<dyn ConversationStore>,
    provider: Arc<dyn CompletionProvider>,
}

impl ContextBuilder {
    pub fn new(store: Arc<dyn ConversationStore>, provider: Arc<dyn CompletionProvider>) -> Self {
        Self { store, provider }
    }

    /// `[system] + tail(context_size) + [user]`. Nothing is persisted.
    pub async fn build(
        &self,
        system_prompt: &str,
        context_size: usize,
        user_input: &str,
    ) -> Result<Vec<ChatMessage>> {
        let history = self.store.tail(context_size).await?;
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend(history.into_iter().map(ChatMessage::from));
        messages.push(ChatMessage::user(user_input));
        Ok(messages)
    }

    /// Run one exchange and record it.
    ///
    /// A completion failure is returned to the caller. A failure to record
    /// the exchange is only logged: the reply is still returned, it just
    /// will not appear in later context.
    pub async fn exchange(&self, settings: &ChatSettings, user_input: &str) -> Result<String> {
        let messages = self
            .build(&settings.system_prompt, settings.context_size, user_input)
            .await?;

        let reply = self
            .provider
            .complete(&settings.model, &messages, settings.temperature)
            .await?;

        if let Err(error) = self.store.append_exchange(user_input, &reply).await {
            tracing::warn!(
                provider = self.provider.name(),
                "chat exchange not recorded, it will be missing from later context: {error:#}"
            );
        }

        Ok(reply)
    }
}
