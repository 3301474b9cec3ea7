//! Bot API wire types (only the fields this bot reads).

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(super) struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Message {
    pub chat: Chat,
    pub text: Option<String>,
    #[serde(default)]
    pub date: u64,
}

#[derive(Debug, Deserialize)]
pub(super) struct Chat {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct GetUpdates {
    pub offset: i64,
    pub timeout: u64,
    pub allowed_updates: [&'static str; 1],
}

#[derive(Debug, Serialize)]
pub(super) struct SendMessage<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub(super) struct CommandSpec {
    pub command: String,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub(super) struct SetMyCommands {
    pub commands: Vec<CommandSpec>,
}
