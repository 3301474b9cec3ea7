use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Number of stored turns replayed as context on every exchange.
    #[serde(default = "default_context")]
    pub context: usize,
    /// Number of most recent turns kept by the retention sweep.
    #[serde(default = "default_retain", alias = "clean")]
    pub retain: usize,
    /// Cron expression (UTC) for the retention sweep.
    #[serde(default = "default_clean_schedule")]
    pub clean_schedule: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_system_prompt() -> String {
    "You are a concise, helpful assistant.".into()
}

fn default_context() -> usize {
    10
}

fn default_retain() -> usize {
    100
}

fn default_clean_schedule() -> String {
    "0 0 2 * * *".into()
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            system_prompt: default_system_prompt(),
            context: default_context(),
            retain: default_retain(),
            clean_schedule: default_clean_schedule(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ChatConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
