use super::health::{self, HealthSnapshot};
use crate::config::Config;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tokio::time::Duration;

const STATE_FILE_NAME: &str = "daemon_state.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonStatus {
    #[serde(flatten)]
    pub snapshot: HealthSnapshot,
    pub written_at: String,
}

/// The state file lives next to the database.
pub fn state_file_path(config: &Config) -> PathBuf {
    config
        .storage
        .resolved_db_path()
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        .join(STATE_FILE_NAME)
}

/// Read the last status written by a running daemon, if any.
pub fn read_state_file(path: &Path) -> Result<Option<DaemonStatus>> {
    let raw = match std::fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };
    let status = serde_json::from_slice(&raw)
        .with_context(|| format!("Malformed daemon state file {}", path.display()))?;
    Ok(Some(status))
}

pub(super) fn spawn_state_writer(path: PathBuf) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Some(parent) = path.parent()
            && let Err(error) = tokio::fs::create_dir_all(parent).await
        {
            tracing::warn!(%error, "failed to create state file directory");
        }

        let mut interval = tokio::time::interval(Duration::from_secs(super::STATUS_FLUSH_SECONDS));
        loop {
            interval.tick().await;
            if let Err(error) = write_state_file(&path).await {
                tracing::warn!(%error, "failed to write daemon state file");
            }
        }
    })
}

async fn write_state_file(path: &Path) -> Result<()> {
    let status = DaemonStatus {
        snapshot: health::snapshot(),
        written_at: Utc::now().to_rfc3339(),
    };
    let data = serde_json::to_vec_pretty(&status)?;
    tokio::fs::write(path, data).await?;
    Ok(())
}
