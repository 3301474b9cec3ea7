use chrono::{DateTime, Utc};
use std::fmt;

/// Lifecycle state reported by the cloud control plane.
///
/// The well-known EC2 states get their own variants; anything else the
/// provider reports is carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InstanceState {
    Pending,
    Running,
    ShuttingDown,
    Terminated,
    Stopping,
    Stopped,
    Other(String),
}

impl InstanceState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "shutting-down" => Self::ShuttingDown,
            "terminated" => Self::Terminated,
            "stopping" => Self::Stopping,
            "stopped" => Self::Stopped,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::ShuttingDown => "shutting-down",
            Self::Terminated => "terminated",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the instance registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRecord {
    pub name: String,
    pub instance_id: Option<String>,
    pub active: bool,
    /// Index in the configured list; drives prefix resolution order.
    pub position: i64,
    /// `None` until the first observation has been recorded.
    pub state: Option<InstanceState>,
    pub soft_check_count: u32,
    pub notified_at: Option<DateTime<Utc>>,
    pub toggled_at: Option<DateTime<Utc>>,
}
