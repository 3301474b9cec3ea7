use crate::app::App;
use crate::config::Config;
use crate::transport::{Channel, Notifier};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

pub mod health;
pub mod lock;
pub mod state;
mod supervisor;
mod workers;

use lock::DaemonLock;
use state::spawn_state_writer;
use supervisor::{RestartPolicy, spawn_component_supervisor};

const STATUS_FLUSH_SECONDS: u64 = 5;
const INBOUND_QUEUE: usize = 32;
const LOCK_FILE_NAME: &str = "dbot.lock";

pub use state::state_file_path;

pub fn lock_file_path(config: &Config) -> PathBuf {
    state_file_path(config).with_file_name(LOCK_FILE_NAME)
}

/// Run every periodic task and the chat loop until Ctrl-C.
pub async fn run(app: Arc<App>, channel: Arc<dyn Channel>) -> Result<()> {
    let config = app.config().load_full();
    let lock = DaemonLock::acquire(&lock_file_path(&config))?;
    let policy = RestartPolicy::from_config(&config.reliability);
    let notifier = Notifier::new(Arc::clone(&channel));

    health::mark_component_ok("daemon");

    let (tx, rx) = mpsc::channel(INBOUND_QUEUE);
    let rx = Arc::new(Mutex::new(rx));

    let mut handles: Vec<JoinHandle<()>> = vec![spawn_state_writer(state_file_path(&config))];

    {
        let app = Arc::clone(&app);
        let notifier = notifier.clone();
        handles.push(spawn_component_supervisor(workers::POLLER, policy, move || {
            workers::run_poller(Arc::clone(&app), notifier.clone())
        }));
    }
    {
        let app = Arc::clone(&app);
        let notifier = notifier.clone();
        handles.push(spawn_component_supervisor(workers::DISK, policy, move || {
            workers::run_disk_monitor(Arc::clone(&app), notifier.clone())
        }));
    }
    {
        let app = Arc::clone(&app);
        handles.push(spawn_component_supervisor(workers::RETENTION, policy, move || {
            workers::run_retention(Arc::clone(&app))
        }));
    }
    {
        let channel = Arc::clone(&channel);
        handles.push(spawn_component_supervisor(workers::LISTENER, policy, move || {
            workers::run_listener(Arc::clone(&channel), tx.clone())
        }));
    }
    {
        let app = Arc::clone(&app);
        let channel = Arc::clone(&channel);
        handles.push(spawn_component_supervisor(workers::DISPATCHER, policy, move || {
            workers::run_dispatcher(Arc::clone(&app), Arc::clone(&channel), Arc::clone(&rx))
        }));
    }
    #[cfg(unix)]
    {
        let app = Arc::clone(&app);
        handles.push(spawn_component_supervisor(workers::RELOADER, policy, move || {
            workers::run_config_reloader(Arc::clone(&app))
        }));
    }

    tracing::info!(
        channel = channel.name(),
        instances = config.ec2.instances.len(),
        lock = %lock.path().display(),
        "dbot daemon started, press Ctrl-C to stop"
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");
    health::mark_component_error("daemon", "shutdown requested");

    for handle in &handles {
        handle.abort();
    }
    for handle in handles {
        let _ = handle.await;
    }

    drop(lock);
    Ok(())
}
