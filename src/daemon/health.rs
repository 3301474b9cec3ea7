//! Process-wide health of the daemon's long-running components.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{LazyLock, RwLock};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ComponentStatus {
    Starting,
    Ok,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    pub updated_at: DateTime<Utc>,
    pub last_ok: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub restart_count: u64,
}

impl ComponentHealth {
    fn starting(now: DateTime<Utc>) -> Self {
        Self {
            status: ComponentStatus::Starting,
            updated_at: now,
            last_ok: None,
            last_error: None,
            restart_count: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub pid: u32,
    pub updated_at: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub components: BTreeMap<String, ComponentHealth>,
}

struct Board {
    started: Instant,
    components: RwLock<BTreeMap<String, ComponentHealth>>,
}

static BOARD: LazyLock<Board> = LazyLock::new(|| Board {
    started: Instant::now(),
    components: RwLock::new(BTreeMap::new()),
});

fn update(component: &str, apply: impl FnOnce(&mut ComponentHealth, DateTime<Utc>)) {
    let Ok(mut components) = BOARD.components.write() else {
        return;
    };
    let now = Utc::now();
    let entry = components
        .entry(component.to_owned())
        .or_insert_with(|| ComponentHealth::starting(now));
    apply(entry, now);
    entry.updated_at = now;
}

/// Record a successful cycle of `component` (a poll tick, a sweep, a listener start).
pub fn mark_component_ok(component: &str) {
    update(component, |entry, now| {
        entry.status = ComponentStatus::Ok;
        entry.last_ok = Some(now);
        entry.last_error = None;
    });
}

/// The message is scrubbed; it ends up in the state file and `dbot status`.
#[allow(clippy::needless_pass_by_value)]
pub fn mark_component_error(component: &str, error: impl ToString) {
    let message = crate::llm::scrub_secret_patterns(&error.to_string()).into_owned();
    update(component, move |entry, _| {
        entry.status = ComponentStatus::Error;
        entry.last_error = Some(message);
    });
}

pub fn bump_component_restart(component: &str) {
    update(component, |entry, _| {
        entry.restart_count = entry.restart_count.saturating_add(1);
    });
}

pub fn snapshot() -> HealthSnapshot {
    let components = BOARD
        .components
        .read()
        .map(|components| components.clone())
        .unwrap_or_default();

    HealthSnapshot {
        pid: std::process::id(),
        updated_at: Utc::now(),
        uptime_seconds: BOARD.started.elapsed().as_secs(),
        components,
    }
}
