use super::markdown;
use super::traits::{Channel, MessageFormat};
use crate::instances::StateNotification;
use std::sync::Arc;

/// Delivers monitor notifications to the operator.
///
/// Delivery is best effort: a failed send is logged and not retried, so a
/// confirmed transition is announced at most once.
#[derive(Clone)]
pub struct Notifier {
    channel: Arc<dyn Channel>,
}

impl Notifier {
    pub fn new(channel: Arc<dyn Channel>) -> Self {
        Self { channel }
    }

    /// Returns how many notifications were delivered.
    pub async fn instance_states(&self, notifications: &[StateNotification]) -> usize {
        let mut delivered = 0;
        for notification in notifications {
            let text = markdown::state_notification(notification);
            match self.channel.send(&text, MessageFormat::MarkdownV2).await {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!(
                    instance = %notification.name,
                    state = %notification.state,
                    "state notification not delivered: {e:#}"
                ),
            }
        }
        delivered
    }

    pub async fn disk_usage(&self, percent: f64) -> bool {
        let text = markdown::disk_notification(percent);
        match self.channel.send(&text, MessageFormat::MarkdownV2).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(percent, "disk notification not delivered: {e:#}");
                false
            }
        }
    }
}
