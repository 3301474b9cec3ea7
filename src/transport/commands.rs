use std::str::FromStr;
use strum::IntoEnumIterator;

/// Commands the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum BotCommand {
    /// Toggle the named instances between running and stopped.
    Ec2,
    /// Report host OS and build information.
    Version,
}

impl BotCommand {
    pub fn description(self) -> &'static str {
        match self {
            Self::Ec2 => "Start or stop EC2 instances by name",
            Self::Version => "Show host and bot version",
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

/// Parsed inbound text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Free text for the assistant.
    Message(String),
    Command { command: BotCommand, args: Vec<String> },
    /// A `/word` that names no known command.
    Unknown(String),
}

impl InboundEvent {
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Self::Message(text.to_string());
        };

        let mut words = rest.split_whitespace();
        let head = words.next().unwrap_or_default();
        // `/ec2@my_bot` addresses this bot explicitly in group chats.
        let name = head.split('@').next().unwrap_or_default();
        let args = words.map(str::to_string).collect();

        match BotCommand::from_str(&name.to_ascii_lowercase()) {
            Ok(command) => Self::Command { command, args },
            Err(_) => Self::Unknown(name.to_string()),
        }
    }
}

/// Hint sent back for unknown commands.
pub fn help_text() -> String {
    let lines: Vec<String> = BotCommand::all()
        .map(|command| format!("/{command} - {}", command.description()))
        .collect();
    format!("Unknown command. Available commands:\n{}", lines.join("\n"))
}
