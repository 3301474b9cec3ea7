use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskConfig {
    #[serde(default = "default_path")]
    pub path: PathBuf,
    /// Usage percentage at or above which a notification is sent.
    #[serde(default = "default_notify_at")]
    pub notify_at: f64,
    #[serde(default = "default_check_every_hours", alias = "notify_every")]
    pub check_every_hours: u64,
}

fn default_path() -> PathBuf {
    PathBuf::from("/")
}

fn default_notify_at() -> f64 {
    90.0
}

fn default_check_every_hours() -> u64 {
    6
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            notify_at: default_notify_at(),
            check_every_hours: default_check_every_hours(),
        }
    }
}

impl DiskConfig {
    pub fn check_every(&self) -> Duration {
        Duration::from_secs(self.check_every_hours.max(1).saturating_mul(3600))
    }
}
