use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ec2Config {
    #[serde(default)]
    pub region: String,
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// Query API endpoint override; defaults to the regional EC2 endpoint.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_check_every_secs", alias = "check_every")]
    pub check_every_secs: u64,
    #[serde(default = "default_notify_every_hours", alias = "notify_every")]
    pub notify_every_hours: u64,
    #[serde(default = "default_soft_check_threshold")]
    pub soft_check_threshold: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Watched instances, in resolution order.
    #[serde(default)]
    pub instances: Vec<InstanceEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceEntry {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
}

impl InstanceEntry {
    pub fn new(name: impl Into<String>, id: Option<&str>) -> Self {
        Self {
            name: name.into(),
            id: id.map(str::to_string),
        }
    }
}

fn default_profile() -> String {
    "default".into()
}

fn default_check_every_secs() -> u64 {
    60
}

fn default_notify_every_hours() -> u64 {
    1
}

fn default_soft_check_threshold() -> u32 {
    2
}

fn default_request_timeout_secs() -> u64 {
    15
}

impl Default for Ec2Config {
    fn default() -> Self {
        Self {
            region: String::new(),
            profile: default_profile(),
            access_key_id: None,
            secret_access_key: None,
            endpoint: None,
            check_every_secs: default_check_every_secs(),
            notify_every_hours: default_notify_every_hours(),
            soft_check_threshold: default_soft_check_threshold(),
            request_timeout_secs: default_request_timeout_secs(),
            instances: Vec::new(),
        }
    }
}

impl Ec2Config {
    pub fn check_every(&self) -> Duration {
        Duration::from_secs(self.check_every_secs.max(1))
    }

    pub fn notify_every(&self) -> chrono::TimeDelta {
        let hours = i64::try_from(self.notify_every_hours).unwrap_or(i64::MAX / 3600);
        chrono::TimeDelta::try_hours(hours).unwrap_or(chrono::TimeDelta::MAX)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn endpoint_url(&self) -> String {
        match self.endpoint.as_deref().map(str::trim) {
            Some(endpoint) if !endpoint.is_empty() => endpoint.trim_end_matches('/').to_string(),
            _ => format!("https://ec2.{}.amazonaws.com", self.region),
        }
    }
}
