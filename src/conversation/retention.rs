use super::store::ConversationStore;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Trims the conversation log down to a bounded tail on a cron schedule.
pub struct RetentionSweeper {
    store: Arc<dyn ConversationStore>,
}

impl RetentionSweeper {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    pub async fn sweep(&self, keep_last: usize) -> Result<u64> {
        let deleted = self.store.trim(keep_last).await?;
        if deleted > 0 {
            tracing::info!(deleted, keep_last, "conversation log trimmed");
        } else {
            tracing::debug!(keep_last, "conversation log within retention");
        }
        Ok(deleted)
    }

    /// When the next sweep is due for `schedule`.
    pub fn next_run(schedule: &str, from: DateTime<Utc>) -> Result<DateTime<Utc>> {
        crate::schedule::next_run_for(schedule, from)
    }
}
