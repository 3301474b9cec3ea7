use crate::llm::{ChatMessage, Role};

/// One persisted message of the assistant dialogue. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    /// Store-assigned, strictly increasing.
    pub sequence_id: i64,
    pub role: Role,
    pub content: String,
    pub created_at: String,
}

impl From<ConversationTurn> for ChatMessage {
    fn from(turn: ConversationTurn) -> Self {
        Self {
            role: turn.role,
            content: turn.content,
        }
    }
}
