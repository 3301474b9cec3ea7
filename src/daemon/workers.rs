use super::health;
use crate::app::App;
use crate::disk::DiskUsage;
use crate::transport::{Channel, InboundMessage, MessageFormat, Notifier};
use anyhow::{Result, bail};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub(super) const POLLER: &str = "poller";
pub(super) const DISK: &str = "disk";
pub(super) const RETENTION: &str = "retention";
pub(super) const LISTENER: &str = "listener";
pub(super) const DISPATCHER: &str = "dispatcher";
pub(super) const RELOADER: &str = "config";

/// State poll loop. Each tick completes before the next sleep starts, so
/// ticks never overlap.
pub(super) async fn run_poller(app: Arc<App>, notifier: Notifier) -> Result<()> {
    loop {
        match app.poll(Utc::now()).await {
            Ok(report) => {
                let delivered = notifier.instance_states(&report.notifications).await;
                tracing::debug!(
                    observed = report.observed,
                    failed = report.failed,
                    delivered,
                    "poll tick complete"
                );
                if report.failed > 0 && report.observed == 0 {
                    health::mark_component_error(POLLER, "no instance state could be fetched");
                } else {
                    health::mark_component_ok(POLLER);
                }
            }
            Err(error) => {
                tracing::error!("poll tick failed: {error:#}");
                health::mark_component_error(POLLER, format!("{error:#}"));
            }
        }

        let interval = app.config().load().ec2.check_every();
        tokio::time::sleep(interval).await;
    }
}

pub(super) async fn run_disk_monitor(app: Arc<App>, notifier: Notifier) -> Result<()> {
    loop {
        let config = app.config().load_full();
        match DiskUsage::measure(&config.disk.path) {
            Ok(usage) => {
                let percent = usage.percent_used();
                tracing::debug!(path = %config.disk.path.display(), percent, "disk usage checked");
                if usage.exceeds(config.disk.notify_at) {
                    notifier.disk_usage(percent).await;
                }
                health::mark_component_ok(DISK);
            }
            Err(error) => {
                tracing::warn!("disk check failed: {error:#}");
                health::mark_component_error(DISK, format!("{error:#}"));
            }
        }

        tokio::time::sleep(config.disk.check_every()).await;
    }
}

/// Sleeps until the next `chat.clean_schedule` occurrence, then trims.
pub(super) async fn run_retention(app: Arc<App>) -> Result<()> {
    loop {
        let now = Utc::now();
        let next = app.next_sweep(now)?;
        let wait = (next - now).to_std().unwrap_or_default();
        tracing::debug!(next = %next.to_rfc3339(), "next conversation sweep scheduled");
        tokio::time::sleep(wait).await;

        match app.sweep(None).await {
            Ok(_) => health::mark_component_ok(RETENTION),
            Err(error) => {
                tracing::error!("conversation sweep failed: {error:#}");
                health::mark_component_error(RETENTION, format!("{error:#}"));
            }
        }
    }
}

pub(super) async fn run_listener(
    channel: Arc<dyn Channel>,
    tx: mpsc::Sender<InboundMessage>,
) -> Result<()> {
    health::mark_component_ok(LISTENER);
    channel.listen(tx).await
}

/// Handles inbound messages strictly one at a time.
pub(super) async fn run_dispatcher(
    app: Arc<App>,
    channel: Arc<dyn Channel>,
    rx: Arc<Mutex<mpsc::Receiver<InboundMessage>>>,
) -> Result<()> {
    let mut rx = rx.lock().await;
    health::mark_component_ok(DISPATCHER);

    while let Some(message) = rx.recv().await {
        tracing::debug!(chat_id = message.chat_id, "inbound message");
        let reply = app.handle_inbound(&message.text).await;
        if reply.trim().is_empty() {
            continue;
        }
        if let Err(error) = channel.send(&reply, MessageFormat::Plain).await {
            tracing::warn!(channel = channel.name(), "reply not delivered: {error:#}");
            health::mark_component_error(DISPATCHER, format!("{error:#}"));
        } else {
            health::mark_component_ok(DISPATCHER);
        }
    }

    bail!("inbound queue closed")
}

/// Re-reads the config file on SIGHUP and reconciles the registry.
#[cfg(unix)]
pub(super) async fn run_config_reloader(app: Arc<App>) -> Result<()> {
    use anyhow::Context;
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = signal(SignalKind::hangup()).context("Failed to install SIGHUP handler")?;
    health::mark_component_ok(RELOADER);

    while hangup.recv().await.is_some() {
        if let Err(error) = app.config().reload() {
            tracing::warn!("config reload failed, keeping the previous config: {error:#}");
            health::mark_component_error(RELOADER, format!("{error:#}"));
            continue;
        }
        match app.reconcile().await {
            Ok(()) => health::mark_component_ok(RELOADER),
            Err(error) => {
                tracing::error!("registry reconciliation after reload failed: {error:#}");
                health::mark_component_error(RELOADER, format!("{error:#}"));
            }
        }
    }

    bail!("SIGHUP stream ended")
}
