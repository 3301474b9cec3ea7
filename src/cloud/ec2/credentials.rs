use crate::config::Ec2Config;
use crate::error::CloudError;
use anyhow::{Context, Result};
use directories::BaseDirs;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("session_token", &self.session_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Credentials {
    /// Explicit config keys, then `AWS_*` environment variables, then the
    /// configured profile of the shared credentials file.
    pub fn resolve(config: &Ec2Config) -> Result<Self> {
        if let (Some(id), Some(secret)) = (
            non_empty(config.access_key_id.as_deref()),
            non_empty(config.secret_access_key.as_deref()),
        ) {
            return Ok(Self {
                access_key_id: id.to_string(),
                secret_access_key: secret.to_string(),
                session_token: None,
            });
        }

        if let Some(from_env) = Self::from_env() {
            return Ok(from_env);
        }

        let path = shared_credentials_path().ok_or_else(|| {
            CloudError::Credentials("no home directory for the shared credentials file".into())
        })?;
        Self::from_shared_file(&path, &config.profile)?.ok_or_else(|| {
            CloudError::Credentials(format!(
                "no credentials in config, environment or profile [{}] of {}",
                config.profile,
                path.display()
            ))
            .into()
        })
    }

    fn from_env() -> Option<Self> {
        let id = std::env::var("AWS_ACCESS_KEY_ID").ok()?;
        let secret = std::env::var("AWS_SECRET_ACCESS_KEY").ok()?;
        if id.trim().is_empty() || secret.trim().is_empty() {
            return None;
        }
        Some(Self {
            access_key_id: id,
            secret_access_key: secret,
            session_token: std::env::var("AWS_SESSION_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
        })
    }

    pub fn from_shared_file(path: &Path, profile: &str) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials file {}", path.display()))?;
        Ok(parse_profile(&contents, profile))
    }
}

/// Pull one `[profile]` section out of an INI-style credentials file.
fn parse_profile(contents: &str, profile: &str) -> Option<Credentials> {
    let mut in_section = false;
    let mut id = None;
    let mut secret = None;
    let mut token = None;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_section = section.trim() == profile;
            continue;
        }
        if !in_section {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().to_string();
        match key.trim() {
            "aws_access_key_id" => id = Some(value),
            "aws_secret_access_key" => secret = Some(value),
            "aws_session_token" => token = Some(value),
            _ => {}
        }
    }

    Some(Credentials {
        access_key_id: id?,
        secret_access_key: secret?,
        session_token: token,
    })
}

fn shared_credentials_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("AWS_SHARED_CREDENTIALS_FILE")
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(shellexpand::tilde(&path).into_owned()));
    }
    BaseDirs::new().map(|dirs| dirs.home_dir().join(".aws").join("credentials"))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
