use crate::config::Config;
use crate::daemon::state::DaemonStatus;
use crate::instances::InstanceRecord;
use chrono::{DateTime, Utc};
use std::fmt::Write as _;

fn timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

pub fn render_status(
    config: &Config,
    records: &[InstanceRecord],
    daemon: Option<&DaemonStatus>,
) -> String {
    let mut lines = vec![
        format!("dbot {}", env!("CARGO_PKG_VERSION")),
        format!("config    {}", config.config_path.display()),
        format!("database  {}", config.storage.resolved_db_path().display()),
        format!("region    {}", config.ec2.region),
        format!("model     {}", config.chat.model),
        String::new(),
        "Instances:".to_string(),
    ];

    if records.is_empty() {
        lines.push("  (none configured)".to_string());
    }
    for record in records {
        let mut line = format!(
            "  {:<16} {:<21} {:<14}",
            record.name,
            record.instance_id.as_deref().unwrap_or("(no id)"),
            record
                .state
                .as_ref()
                .map_or("unknown", |state| state.as_str()),
        );
        if record.soft_check_count > 0 {
            let _ = write!(line, " pending-change={}", record.soft_check_count);
        }
        let _ = write!(
            line,
            " notified={} toggled={}",
            timestamp(record.notified_at),
            timestamp(record.toggled_at)
        );
        if !record.active {
            line.push_str(" [removed]");
        }
        lines.push(line);
    }

    lines.push(String::new());
    match daemon {
        None => lines.push("Daemon: no state file (not running?)".to_string()),
        Some(status) => {
            lines.push(format!(
                "Daemon: pid {} up {}s, written {}",
                status.snapshot.pid, status.snapshot.uptime_seconds, status.written_at
            ));
            for (name, component) in &status.snapshot.components {
                let mut line = format!("  {name:<12} {}", component.status);
                if component.restart_count > 0 {
                    let _ = write!(line, " restarts={}", component.restart_count);
                }
                if let Some(error) = &component.last_error {
                    let _ = write!(line, " last_error={error}");
                }
                lines.push(line);
            }
        }
    }

    lines.join("\n")
}
