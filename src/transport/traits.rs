use std::future::Future;
use std::pin::Pin;

/// How outbound text should be rendered by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFormat {
    Plain,
    /// Telegram MarkdownV2; the caller is responsible for escaping.
    MarkdownV2,
}

/// A text message received from the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Chat the message came from; replies go back here.
    pub chat_id: i64,
    pub text: String,
    pub timestamp: u64,
}

/// Messaging transport bound to a single recipient.
pub trait Channel: Send + Sync {
    /// Human-readable channel name
    fn name(&self) -> &str;

    /// Send a message to the configured recipient
    fn send<'a>(
        &'a self,
        message: &'a str,
        format: MessageFormat,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

    /// Start listening for incoming messages (long-running)
    fn listen<'a>(
        &'a self,
        tx: tokio::sync::mpsc::Sender<InboundMessage>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

    /// Check if channel is healthy
    fn health_check<'a>(&'a self) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(async move { true })
    }

    fn max_message_length(&self) -> usize {
        usize::MAX
    }
}
