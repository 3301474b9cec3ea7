mod api;


use self::api::{
    ApiResponse, CommandSpec, GetUpdates, SendMessage, SetMyCommands, Update,
};
use super::chunker::{TELEGRAM_MAX_CHARS, chunk_message};
use super::commands::BotCommand;
use super::traits::{Channel, InboundMessage, MessageFormat};
use crate::config::TelegramConfig;
use crate::error::TransportError;
use crate::llm::sanitize_api_error;
use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

const CHANNEL: &str = "telegram";
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Telegram channel: long-polls the Bot API and talks to one chat.
pub struct TelegramChannel {
    bot_token: String,
    recipient_id: i64,
    api_base: String,
    poll_timeout_secs: u64,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(config: &TelegramConfig) -> Self {
        // The HTTP timeout has to outlast the long-poll window.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_secs + 15))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            bot_token: config.bot_token.clone(),
            recipient_id: config.recipient_id,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            poll_timeout_secs: config.poll_timeout_secs,
            client,
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.bot_token)
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Connection {
                channel: CHANNEL.into(),
                message: sanitize_api_error(&e.to_string()),
            })?;

        let status = response.status();
        let parsed: ApiResponse<T> =
            response.json().await.map_err(|e| TransportError::Connection {
                channel: CHANNEL.into(),
                message: format!("{method} returned unreadable body ({status}): {e}"),
            })?;

        if !parsed.ok {
            return Err(TransportError::Send {
                channel: CHANNEL.into(),
                message: format!(
                    "{method} failed ({status}): {}",
                    sanitize_api_error(parsed.description.as_deref().unwrap_or("no description"))
                ),
            }
            .into());
        }

        parsed.result.ok_or_else(|| {
            TransportError::Send {
                channel: CHANNEL.into(),
                message: format!("{method} returned no result"),
            }
            .into()
        })
    }

    /// Publish the command list shown in the client's command menu.
    pub async fn register_commands(&self) -> Result<()> {
        let body = SetMyCommands {
            commands: BotCommand::all()
                .map(|command| CommandSpec {
                    command: command.to_string(),
                    description: command.description(),
                })
                .collect(),
        };
        let _: bool = self.call("setMyCommands", &body).await?;
        tracing::debug!("telegram command menu registered");
        Ok(())
    }

    async fn get_updates(&self, offset: i64, timeout: u64) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            &GetUpdates {
                offset,
                timeout,
                allowed_updates: ["message"],
            },
        )
        .await
    }

    /// Offset just past whatever was queued before startup, so stale
    /// commands are not replayed.
    async fn skip_pending_updates(&self) -> Result<i64> {
        let pending = self.get_updates(-1, 0).await?;
        Ok(pending
            .last()
            .map_or(0, |update| update.update_id + 1))
    }

    /// Keep text messages from the configured chat; drop everything else.
    fn accept(&self, update: Update) -> Option<InboundMessage> {
        let message = update.message?;
        if message.chat.id != self.recipient_id {
            tracing::warn!(
                chat_id = message.chat.id,
                "Telegram: ignoring message from unauthorized chat"
            );
            return None;
        }
        let text = message.text?;
        Some(InboundMessage {
            chat_id: message.chat.id,
            text,
            timestamp: message.date,
        })
    }
}

impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        CHANNEL
    }

    fn max_message_length(&self) -> usize {
        TELEGRAM_MAX_CHARS
    }

    fn send<'a>(
        &'a self,
        message: &'a str,
        format: MessageFormat,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let parse_mode = match format {
                MessageFormat::Plain => None,
                MessageFormat::MarkdownV2 => Some("MarkdownV2"),
            };
            for chunk in chunk_message(message, self.max_message_length()) {
                let body = SendMessage {
                    chat_id: self.recipient_id,
                    text: &chunk,
                    parse_mode,
                };
                let _: serde_json::Value = self.call("sendMessage", &body).await?;
            }
            Ok(())
        })
    }

    fn listen<'a>(
        &'a self,
        tx: tokio::sync::mpsc::Sender<InboundMessage>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let mut offset = match self.skip_pending_updates().await {
                Ok(offset) => offset,
                Err(e) => {
                    tracing::warn!("Telegram: could not skip pending updates: {e:#}");
                    0
                }
            };

            tracing::info!("Telegram channel listening for messages...");

            loop {
                let updates = match self.get_updates(offset, self.poll_timeout_secs).await {
                    Ok(updates) => updates,
                    Err(e) => {
                        tracing::warn!("Telegram poll error: {e:#}");
                        tokio::time::sleep(RETRY_DELAY).await;
                        continue;
                    }
                };

                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    let Some(message) = self.accept(update) else {
                        continue;
                    };
                    if tx.send(message).await.is_err() {
                        return Ok(());
                    }
                }
            }
        })
    }

    fn health_check<'a>(&'a self) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(async move {
            self.call::<_, serde_json::Value>("getMe", &serde_json::json!({}))
                .await
                .is_ok()
        })
    }
}
