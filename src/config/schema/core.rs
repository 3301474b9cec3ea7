use super::{ChatConfig, DiskConfig, Ec2Config, TelegramConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to dbot.toml - resolved at load time, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default, alias = "tg")]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub ec2: Ec2Config,

    #[serde(default, alias = "du")]
    pub disk: DiskConfig,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub reliability: ReliabilityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: crate::config::default_config_path(),
            telegram: TelegramConfig::default(),
            ec2: Ec2Config::default(),
            disk: DiskConfig::default(),
            chat: ChatConfig::default(),
            storage: StorageConfig::default(),
            reliability: ReliabilityConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Database file; defaults to `$XDG_STATE_HOME/dbot.db`.
    #[serde(default)]
    pub db_path: Option<String>,
}

impl StorageConfig {
    pub fn resolved_db_path(&self) -> PathBuf {
        match self.db_path.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => PathBuf::from(shellexpand::tilde(raw).into_owned()),
            _ => crate::config::default_state_dir().join("dbot.db"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReliabilityConfig {
    #[serde(default = "default_component_backoff_secs")]
    pub component_initial_backoff_secs: u64,
    #[serde(default = "default_component_backoff_max_secs")]
    pub component_max_backoff_secs: u64,
    #[serde(default = "default_component_max_restarts")]
    pub component_max_restarts: u32,
}

fn default_component_backoff_secs() -> u64 {
    2
}

fn default_component_backoff_max_secs() -> u64 {
    60
}

fn default_component_max_restarts() -> u32 {
    10
}

impl Default for ReliabilityConfig {
    fn default() -> Self {
        Self {
            component_initial_backoff_secs: default_component_backoff_secs(),
            component_max_backoff_secs: default_component_backoff_max_secs(),
            component_max_restarts: default_component_max_restarts(),
        }
    }
}
