pub mod chunker;
pub mod commands;
pub mod markdown;
pub mod notifier;
pub mod telegram;
pub mod traits;

pub use commands::{BotCommand, InboundEvent};
pub use notifier::Notifier;
pub use telegram::TelegramChannel;
pub use traits::{Channel, InboundMessage, MessageFormat};
