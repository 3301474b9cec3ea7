use super::registry;
use super::types::InstanceState;
use crate::cloud::CloudControl;
use crate::error::CloudError;
use crate::storage::Database;
use anyhow::Result;
use chrono::Utc;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Started,
    Stopped,
    /// Transitional state; no action issued.
    Skipped(InstanceState),
    NotFound,
    /// Only produced by [`ToggleActuator::toggle_many`].
    Failed(String),
}

impl fmt::Display for ToggleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => f.write_str("starting"),
            Self::Stopped => f.write_str("stopping"),
            Self::Skipped(state) => write!(f, "is {state}, left unchanged"),
            Self::NotFound => f.write_str("not found"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct ToggleReport {
    pub results: Vec<(String, ToggleOutcome)>,
}

impl ToggleReport {
    pub fn any_not_found(&self) -> bool {
        self.results
            .iter()
            .any(|(_, outcome)| *outcome == ToggleOutcome::NotFound)
    }
}

/// Flips instances between running and stopped on request.
pub struct ToggleActuator {
    db: Database,
    cloud: Arc<dyn CloudControl>,
}

impl ToggleActuator {
    pub fn new(db: Database, cloud: Arc<dyn CloudControl>) -> Self {
        Self { db, cloud }
    }

    /// Start a stopped instance or stop a running one.
    ///
    /// `toggled_at` is only written when a start or stop was issued.
    pub async fn toggle(&self, name: &str, timeout: Duration) -> Result<ToggleOutcome> {
        let record = {
            let mut conn = self.db.pool().acquire().await?;
            registry::resolve(&mut conn, name).await?
        };
        let Some((record, instance_id)) =
            record.and_then(|r| r.instance_id.clone().map(|id| (r, id)))
        else {
            return Ok(ToggleOutcome::NotFound);
        };

        let current = with_timeout(
            "DescribeInstances",
            &instance_id,
            timeout,
            self.cloud.describe_state(&instance_id),
        )
        .await?;
        let outcome = match current {
            InstanceState::Stopped => {
                with_timeout("StartInstances", &instance_id, timeout, self.cloud.start(&instance_id))
                    .await?;
                ToggleOutcome::Started
            }
            InstanceState::Running => {
                with_timeout("StopInstances", &instance_id, timeout, self.cloud.stop(&instance_id))
                    .await?;
                ToggleOutcome::Stopped
            }
            other => {
                tracing::info!(instance = %record.name, state = %other, "toggle skipped for transitional state");
                return Ok(ToggleOutcome::Skipped(other));
            }
        };

        let mut tx = self.db.pool().begin().await?;
        registry::mark_toggled(&mut tx, &record.name, Utc::now()).await?;
        tx.commit().await?;

        tracing::info!(instance = %record.name, %instance_id, outcome = %outcome, "instance toggled");
        Ok(outcome)
    }

    /// Toggle each name independently; one failure never blocks the rest.
    pub async fn toggle_many(&self, names: &[String], timeout: Duration) -> ToggleReport {
        let mut report = ToggleReport::default();
        for name in names {
            let outcome = match self.toggle(name, timeout).await {
                Ok(outcome) => outcome,
                Err(error) => {
                    tracing::warn!(instance = %name, "toggle failed: {error:#}");
                    ToggleOutcome::Failed(format!("{error:#}"))
                }
            };
            report.results.push((name.clone(), outcome));
        }
        report
    }
}

async fn with_timeout<T>(
    action: &str,
    instance_id: &str,
    timeout: Duration,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| CloudError::Timeout {
            action: action.to_string(),
            instance_id: instance_id.to_string(),
            elapsed: timeout,
        })?
}
