use super::Config;
use crate::error::ConfigError;
use std::collections::HashSet;

impl Config {
    /// Reject configurations the daemon cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(&self.telegram.bot_token, "telegram.bot_token")?;
        if self.telegram.recipient_id == 0 {
            return Err(missing("telegram.recipient_id"));
        }
        require(&self.ec2.region, "ec2.region")?;
        require(&self.chat.api_key, "chat.api_key")?;
        require(&self.chat.model, "chat.model")?;

        if self.ec2.soft_check_threshold == 0 {
            return Err(ConfigError::Validation(
                "ec2.soft_check_threshold must be at least 1".into(),
            ));
        }

        if !(0.0..=2.0).contains(&self.chat.temperature) {
            return Err(ConfigError::Validation(format!(
                "chat.temperature must be within 0.0..=2.0, got {}",
                self.chat.temperature
            )));
        }

        if !(0.0..=100.0).contains(&self.disk.notify_at) {
            return Err(ConfigError::Validation(format!(
                "disk.notify_at must be a percentage, got {}",
                self.disk.notify_at
            )));
        }

        crate::schedule::validate_expression(&self.chat.clean_schedule)
            .map_err(|e| ConfigError::Validation(format!("chat.clean_schedule: {e}")))?;

        let mut seen = HashSet::new();
        for entry in &self.ec2.instances {
            let name = entry.name.trim();
            if name.is_empty() {
                return Err(ConfigError::Validation(
                    "ec2.instances entries need a non-empty name".into(),
                ));
            }
            if !seen.insert(name) {
                return Err(ConfigError::Validation(format!(
                    "duplicate instance name in ec2.instances: {name}"
                )));
            }
        }

        Ok(())
    }
}

fn require(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        Err(missing(field))
    } else {
        Ok(())
    }
}

fn missing(field: &str) -> ConfigError {
    ConfigError::Validation(format!("missing required field {field}"))
}
