use super::health;
use crate::config::ReliabilityConfig;
use anyhow::Result;
use std::future::Future;
use tokio::task::JoinHandle;
use tokio::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RestartPolicy {
    pub initial_backoff_secs: u64,
    pub max_backoff_secs: u64,
    /// Zero means restart forever.
    pub max_restarts: u32,
}

impl RestartPolicy {
    pub fn from_config(config: &ReliabilityConfig) -> Self {
        let initial = config.component_initial_backoff_secs.max(1);
        Self {
            initial_backoff_secs: initial,
            max_backoff_secs: config.component_max_backoff_secs.max(initial),
            max_restarts: config.component_max_restarts,
        }
    }
}

/// Run `run_component` until it has failed more than `max_restarts` times in a
/// row, sleeping with exponential backoff between attempts.
pub(super) fn spawn_component_supervisor<F, Fut>(
    name: &'static str,
    policy: RestartPolicy,
    mut run_component: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        let initial_backoff = policy.initial_backoff_secs.max(1);
        let max_backoff = policy.max_backoff_secs.max(initial_backoff);
        let mut backoff = initial_backoff;
        let mut consecutive_failures: u32 = 0;

        loop {
            tracing::info!(component = name, "daemon component starting");
            match run_component().await {
                Ok(()) => {
                    tracing::warn!(component = name, "daemon component exited unexpectedly");
                    health::mark_component_error(name, "component exited");
                    backoff = initial_backoff;
                    consecutive_failures = consecutive_failures.saturating_add(1);
                }
                Err(e) => {
                    tracing::error!(component = name, "daemon component failed: {e:#}");
                    health::mark_component_error(name, format!("{e:#}"));
                    consecutive_failures = consecutive_failures.saturating_add(1);
                }
            }

            if policy.max_restarts > 0 && consecutive_failures > policy.max_restarts {
                tracing::error!(
                    component = name,
                    max_restarts = policy.max_restarts,
                    "daemon component exceeded max restarts, circuit open"
                );
                break;
            }
            health::bump_component_restart(name);
            tokio::time::sleep(Duration::from_secs(backoff)).await;
            backoff = backoff.saturating_mul(2).min(max_backoff);
        }
    })
}
