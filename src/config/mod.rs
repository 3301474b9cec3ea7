mod env_overrides;
pub mod hot_reload;
mod loader;
pub mod schema;
mod validate;

pub use hot_reload::ConfigHandle;
pub use schema::{
    ChatConfig, Config, DiskConfig, Ec2Config, InstanceEntry, ReliabilityConfig, StorageConfig,
    TelegramConfig,
};

use directories::BaseDirs;
use std::path::PathBuf;

const CONFIG_FILE_NAME: &str = "dbot.toml";

/// `$XDG_CONFIG_HOME/dbot.toml`, falling back to the working directory.
pub fn default_config_path() -> PathBuf {
    BaseDirs::new().map_or_else(
        || PathBuf::from(CONFIG_FILE_NAME),
        |dirs| dirs.config_dir().join(CONFIG_FILE_NAME),
    )
}

/// `$XDG_STATE_HOME`, or the local data directory where no state dir exists.
pub fn default_state_dir() -> PathBuf {
    BaseDirs::new().map_or_else(
        || PathBuf::from("."),
        |dirs| {
            dirs.state_dir()
                .unwrap_or_else(|| dirs.data_local_dir())
                .to_path_buf()
        },
    )
}
