use std::sync::Arc;

use dbot::conversation::{ContextBuilder, ConversationStore};
use dbot::llm::{ChatMessage, CompletionProvider, Role};

use super::fakes::{FakeProvider, ReadOnlyStore};
use super::{chat_settings, seed, store};

#[tokio::test]
async fn prompt_is_system_then_tail_then_user() {
    let store = store().await;
    seed(store.as_ref(), 3).await;
    let provider = FakeProvider::new();
    let builder = ContextBuilder::new(
        Arc::clone(&store) as Arc<dyn ConversationStore>,
        Arc::clone(&provider) as Arc<dyn CompletionProvider>,
    );

    builder.exchange(&chat_settings(2), "what now?").await.unwrap();

    let prompts = provider.prompts();
    assert_eq!(
        prompts[0],
        vec![
            ChatMessage::system("You are terse."),
            ChatMessage::user("question 2"),
            ChatMessage::assistant("answer 2"),
            ChatMessage::user("what now?"),
        ]
    );
}

#[tokio::test]
async fn context_grows_across_exchanges_up_to_window() {
    let store = store().await;
    let provider = FakeProvider::new();
    provider.reply("first reply");
    provider.reply("second reply");
    let builder = ContextBuilder::new(
        Arc::clone(&store) as Arc<dyn ConversationStore>,
        Arc::clone(&provider) as Arc<dyn CompletionProvider>,
    );
    let settings = chat_settings(4);

    let first = builder.exchange(&settings, "hello").await.unwrap();
    let second = builder.exchange(&settings, "again").await.unwrap();

    assert_eq!(first, "first reply");
    assert_eq!(second, "second reply");
    let prompts = provider.prompts();
    assert_eq!(prompts[0].len(), 2);
    assert_eq!(prompts[1].len(), 4);
    assert_eq!(prompts[1][2], ChatMessage::assistant("first reply"));
    assert_eq!(store.count().await.unwrap(), 4);
}

#[tokio::test]
async fn zero_context_sends_only_system_and_user() {
    let store = store().await;
    seed(store.as_ref(), 2).await;
    let provider = FakeProvider::new();
    let builder = ContextBuilder::new(
        Arc::clone(&store) as Arc<dyn ConversationStore>,
        Arc::clone(&provider) as Arc<dyn CompletionProvider>,
    );

    builder.exchange(&chat_settings(0), "solo").await.unwrap();

    let roles: Vec<Role> = provider.prompts()[0].iter().map(|m| m.role).collect();
    assert_eq!(roles, [Role::System, Role::User]);
}

#[tokio::test]
async fn failed_completion_records_nothing() {
    let store = store().await;
    let provider = FakeProvider::new();
    provider.fail_next("upstream 503");
    let builder = ContextBuilder::new(
        Arc::clone(&store) as Arc<dyn ConversationStore>,
        Arc::clone(&provider) as Arc<dyn CompletionProvider>,
    );

    let err = builder.exchange(&chat_settings(4), "hello").await.unwrap_err();

    assert!(err.to_string().contains("upstream 503"));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn build_does_not_persist() {
    let store = store().await;
    let provider = FakeProvider::new();
    let builder = ContextBuilder::new(
        Arc::clone(&store) as Arc<dyn ConversationStore>,
        Arc::clone(&provider) as Arc<dyn CompletionProvider>,
    );

    let messages = builder.build("sys", 10, "draft").await.unwrap();

    assert_eq!(messages.len(), 2);
    assert_eq!(store.count().await.unwrap(), 0);
    assert!(provider.prompts().is_empty());
}

#[tokio::test]
async fn reply_is_returned_even_when_exchange_cannot_be_recorded() {
    let store = store().await;
    seed(store.as_ref(), 2).await;
    let provider = FakeProvider::new();
    provider.reply("still answered");
    let builder = ContextBuilder::new(
        ReadOnlyStore::wrap(Arc::clone(&store) as Arc<dyn ConversationStore>),
        Arc::clone(&provider) as Arc<dyn CompletionProvider>,
    );

    let reply = builder.exchange(&chat_settings(4), "are you there?").await.unwrap();

    assert_eq!(reply, "still answered");
    assert_eq!(provider.prompts()[0].len(), 6);
    assert_eq!(store.count().await.unwrap(), 4);
}
