use std::sync::Arc;

use chrono::{TimeZone, Utc};
use dbot::conversation::{ConversationStore, RetentionSweeper};

use super::{seed, store};

#[tokio::test]
async fn sweep_keeps_newest_turns_in_order() {
    let store = store().await;
    seed(store.as_ref(), 5).await;
    let sweeper = RetentionSweeper::new(Arc::clone(&store) as Arc<dyn ConversationStore>);

    let deleted = sweeper.sweep(4).await.unwrap();

    assert_eq!(deleted, 6);
    let remaining: Vec<String> = store
        .tail(10)
        .await
        .unwrap()
        .into_iter()
        .map(|turn| turn.content)
        .collect();
    assert_eq!(remaining, ["question 3", "answer 3", "question 4", "answer 4"]);
}

#[tokio::test]
async fn sequence_keeps_increasing_after_sweep() {
    let store = store().await;
    seed(store.as_ref(), 3).await;
    let before = store.tail(1).await.unwrap()[0].sequence_id;
    let sweeper = RetentionSweeper::new(Arc::clone(&store) as Arc<dyn ConversationStore>);

    sweeper.sweep(0).await.unwrap();
    assert_eq!(store.count().await.unwrap(), 0);

    seed(store.as_ref(), 1).await;
    let after = store.tail(2).await.unwrap();
    assert!(after[0].sequence_id > before);
}

#[tokio::test]
async fn sweep_under_retention_is_a_no_op() {
    let store = store().await;
    seed(store.as_ref(), 1).await;
    let sweeper = RetentionSweeper::new(Arc::clone(&store) as Arc<dyn ConversationStore>);

    assert_eq!(sweeper.sweep(50).await.unwrap(), 0);
    assert_eq!(store.count().await.unwrap(), 2);
}

#[test]
fn default_schedule_runs_daily_at_two_utc() {
    let from = Utc.with_ymd_and_hms(2024, 5, 1, 3, 0, 0).unwrap();
    let next = RetentionSweeper::next_run("0 0 2 * * *", from).unwrap();
    assert_eq!(next, Utc.with_ymd_and_hms(2024, 5, 2, 2, 0, 0).unwrap());
}
