use super::registry;
use super::types::{InstanceRecord, InstanceState};
use crate::cloud::CloudControl;
use crate::config::Ec2Config;
use crate::error::CloudError;
use crate::storage::Database;
use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Knobs for one poll tick, taken from the current config snapshot.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub notify_every: TimeDelta,
    pub soft_check_threshold: u32,
    pub request_timeout: Duration,
}

impl PollSettings {
    pub fn from_config(config: &Ec2Config) -> Self {
        Self {
            notify_every: config.notify_every(),
            soft_check_threshold: config.soft_check_threshold.max(1),
            request_timeout: config.request_timeout(),
        }
    }
}

/// What one observation does to a stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Matches the stored state, nothing to announce.
    Steady,
    /// Matches the stored state and the re-announce interval has elapsed.
    Reannounce,
    /// Disagrees with the stored state, not yet confirmed.
    Suspected { count: u32 },
    /// Disagreement confirmed (or first observation): adopt and announce.
    Confirmed,
}

impl Decision {
    pub fn notifies(&self) -> bool {
        matches!(self, Self::Reannounce | Self::Confirmed)
    }
}

/// Debounce and throttle rules for a single observation.
pub fn evaluate(
    record: &InstanceRecord,
    observed: &InstanceState,
    now: DateTime<Utc>,
    settings: &PollSettings,
) -> Decision {
    let Some(stored) = record.state.as_ref() else {
        return Decision::Confirmed;
    };

    if stored == observed {
        let due = record
            .notified_at
            .is_none_or(|at| now - at > settings.notify_every);
        return if *observed != InstanceState::Stopped && due {
            Decision::Reannounce
        } else {
            Decision::Steady
        };
    }

    let count = record.soft_check_count.saturating_add(1);
    if count >= settings.soft_check_threshold {
        Decision::Confirmed
    } else {
        Decision::Suspected { count }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateNotification {
    pub name: String,
    pub state: InstanceState,
}

#[derive(Debug, Default)]
pub struct PollReport {
    pub observed: usize,
    pub failed: usize,
    pub notifications: Vec<StateNotification>,
}

/// Periodic state check over every active instance.
pub struct StatePoller {
    db: Database,
    cloud: Arc<dyn CloudControl>,
}

impl StatePoller {
    pub fn new(db: Database, cloud: Arc<dyn CloudControl>) -> Self {
        Self { db, cloud }
    }

    /// Run one tick.
    ///
    /// Cloud reads happen first, outside any transaction; a failed or timed
    /// out read leaves that instance untouched. All resulting updates are
    /// then committed in one transaction. Notifications are returned for
    /// the caller to deliver once the commit has succeeded.
    pub async fn tick(&self, settings: &PollSettings, now: DateTime<Utc>) -> Result<PollReport> {
        let snapshot = {
            let mut conn = self.db.pool().acquire().await?;
            registry::list_active(&mut conn).await?
        };

        let mut report = PollReport::default();
        let mut observations = Vec::with_capacity(snapshot.len());
        for record in snapshot {
            let Some(instance_id) = record.instance_id.as_deref() else {
                tracing::debug!(instance = %record.name, "no instance id yet, skipping");
                continue;
            };
            match self.fetch_state(instance_id, settings.request_timeout).await {
                Ok(state) => observations.push((record.name, state)),
                Err(error) => {
                    report.failed += 1;
                    tracing::warn!(
                        instance = %record.name,
                        %instance_id,
                        "state fetch failed: {error:#}"
                    );
                }
            }
        }

        let mut tx = self.db.pool().begin().await.context("begin poll tick")?;
        for (name, observed) in observations {
            // Re-read inside the transaction; a reload may have changed the row.
            let Some(record) = registry::fetch(&mut tx, &name).await? else {
                continue;
            };
            if !record.active {
                continue;
            }
            report.observed += 1;

            let decision = evaluate(&record, &observed, now, settings);
            match &decision {
                Decision::Steady => {
                    registry::store_observation(
                        &mut tx,
                        &name,
                        record.state.as_ref(),
                        0,
                        record.notified_at,
                    )
                    .await?;
                }
                Decision::Reannounce => {
                    registry::store_observation(
                        &mut tx,
                        &name,
                        record.state.as_ref(),
                        0,
                        Some(now),
                    )
                    .await?;
                }
                Decision::Suspected { count } => {
                    tracing::info!(
                        instance = %name,
                        stored = ?record.state.as_ref().map(InstanceState::as_str),
                        observed = %observed,
                        count,
                        "unconfirmed state change"
                    );
                    registry::store_observation(
                        &mut tx,
                        &name,
                        record.state.as_ref(),
                        *count,
                        record.notified_at,
                    )
                    .await?;
                }
                Decision::Confirmed => {
                    tracing::info!(instance = %name, state = %observed, "state change confirmed");
                    registry::store_observation(&mut tx, &name, Some(&observed), 0, Some(now))
                        .await?;
                }
            }

            if decision.notifies() {
                report.notifications.push(StateNotification {
                    name,
                    state: observed,
                });
            }
        }
        tx.commit().await.context("commit poll tick")?;

        Ok(report)
    }

    async fn fetch_state(&self, instance_id: &str, timeout: Duration) -> Result<InstanceState> {
        tokio::time::timeout(timeout, self.cloud.describe_state(instance_id))
            .await
            .map_err(|_| CloudError::Timeout {
                action: "DescribeInstances".into(),
                instance_id: instance_id.to_string(),
                elapsed: timeout,
            })?
    }
}
