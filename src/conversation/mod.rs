pub mod context;
pub mod retention;
pub mod store;
pub mod types;

pub use context::{ChatSettings, ContextBuilder};
pub use retention::RetentionSweeper;
pub use store::{ConversationStore, SqliteConversationStore};
pub use types::ConversationTurn;
