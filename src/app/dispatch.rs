use super::App;
use super::inbound::render_toggle_report;
use super::status::render_status;
use crate::cli::{Cli, Commands};
use crate::config::{Config, ConfigHandle};
use crate::daemon;
use crate::disk::DiskUsage;
use crate::instances::InstanceRegistry;
use crate::storage::Database;
use crate::transport::{Channel, TelegramChannel};
use anyhow::{Context, Result, bail};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::info;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

pub async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    info!(path = %config.config_path.display(), "config loaded");
    let handle = ConfigHandle::new(config);

    match cli.command {
        Commands::Run => {
            let app = Arc::new(App::from_config(handle.clone()).await?);
            let telegram = TelegramChannel::new(&handle.load().telegram);
            if !telegram.health_check().await {
                tracing::warn!("Telegram API not reachable yet, the listener will keep retrying");
            }
            if let Err(error) = telegram.register_commands().await {
                tracing::warn!("could not register the Telegram command menu: {error:#}");
            }
            let channel: Arc<dyn Channel> = Arc::new(telegram);
            daemon::run(app, channel).await
        }
        Commands::Status => {
            let config = handle.load_full();
            let db_path = config.storage.resolved_db_path();
            let db = Database::open(&db_path)
                .await
                .with_context(|| format!("Failed to open database {}", db_path.display()))?;
            let registry = InstanceRegistry::new(db);
            registry.reconcile(&config.ec2.instances).await?;
            let records = registry.all().await?;
            let daemon_status = daemon::state::read_state_file(&daemon::state_file_path(&config))?;
            println!("{}", render_status(&config, &records, daemon_status.as_ref()));
            Ok(())
        }
        Commands::Toggle { names } => {
            let app = App::from_config(handle).await?;
            let report = app.toggle(&names).await;
            println!("{}", render_toggle_report(&report));
            if report.any_not_found() {
                bail!("One or more instances not found");
            }
            Ok(())
        }
        Commands::Chat { message } => {
            if message.trim().is_empty() {
                bail!("Message must not be empty");
            }
            let app = App::from_config(handle).await?;
            let reply = app.chat(&message).await?;
            println!("{reply}");
            Ok(())
        }
        Commands::Clean { keep } => {
            let app = App::from_config(handle).await?;
            let deleted = app.sweep(keep).await?;
            println!("Removed {deleted} conversation turn(s)");
            Ok(())
        }
        Commands::Disk => {
            let config = handle.load_full();
            let usage = DiskUsage::measure(&config.disk.path)?;
            println!("{}", render_disk(&config, &usage));
            Ok(())
        }
    }
}

fn render_disk(config: &Config, usage: &DiskUsage) -> String {
    #[allow(clippy::cast_precision_loss)]
    let (free, total) = (
        usage.free_bytes as f64 / GIB,
        usage.total_bytes as f64 / GIB,
    );
    let mut line = format!(
        "Disk usage of {} is at {}% ({free:.1} GiB free of {total:.1} GiB)",
        config.disk.path.display(),
        usage.percent_used()
    );
    if usage.exceeds(config.disk.notify_at) {
        let _ = write!(line, ", at or above the {}% threshold", config.disk.notify_at);
    }
    line
}
