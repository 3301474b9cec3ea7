pub mod http_client;
pub mod openai;
pub mod scrub;
pub mod traits;
pub mod types;

pub use openai::OpenAiProvider;
pub use scrub::{sanitize_api_error, scrub_secret_patterns};
pub use traits::CompletionProvider;
pub use types::{ChatMessage, Role};
