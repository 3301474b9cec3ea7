use super::types::ChatMessage;
use std::future::Future;
use std::pin::Pin;

/// Stateless text completion. All conversational memory arrives in
/// `messages`; the provider keeps nothing between calls.
pub trait CompletionProvider: Send + Sync {
    /// Provider identifier (e.g. "openai").
    fn name(&self) -> &str;

    fn complete<'a>(
        &'a self,
        model: &'a str,
        messages: &'a [ChatMessage],
        temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;
}
