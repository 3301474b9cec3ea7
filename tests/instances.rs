#[path = "instances/poll.rs"]
mod poll;
#[path = "instances/toggle.rs"]
mod toggle;
#[path = "support/fakes.rs"]
mod fakes;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use dbot::config::InstanceEntry;
use dbot::instances::{InstanceRegistry, PollSettings};
use dbot::storage::Database;

use fakes::FakeCloud;

pub(crate) async fn registry_with(entries: &[(&str, Option<&str>)]) -> (Database, InstanceRegistry) {
    let db = Database::in_memory().await.expect("in-memory database");
    let registry = InstanceRegistry::new(db.clone());
    let entries: Vec<InstanceEntry> = entries
        .iter()
        .map(|(name, id)| InstanceEntry::new(*name, *id))
        .collect();
    registry.reconcile(&entries).await.expect("reconcile");
    (db, registry)
}

pub(crate) fn cloud() -> Arc<FakeCloud> {
    FakeCloud::new()
}

pub(crate) fn settings(threshold: u32) -> PollSettings {
    PollSettings {
        notify_every: TimeDelta::hours(4),
        soft_check_threshold: threshold,
        request_timeout: Duration::from_secs(5),
    }
}

pub(crate) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}
