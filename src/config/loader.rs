use super::Config;
use crate::error::ConfigError;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

impl Config {
    /// Resolve the config path from an explicit flag, `DBOT_CONFIG`, or the
    /// XDG default, then load it.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit.map_or_else(
            || {
                std::env::var("DBOT_CONFIG")
                    .ok()
                    .filter(|value| !value.trim().is_empty())
                    .map_or_else(super::default_config_path, PathBuf::from)
            },
            Path::to_path_buf,
        );
        Self::load_from_path(&path)
    }

    /// Read, parse, apply environment overrides and validate.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.config_path = path.to_path_buf();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| ConfigError::Load(e.to_string()).into())
    }
}
