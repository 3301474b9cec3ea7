pub mod dispatch;
pub mod inbound;
pub mod status;

use crate::cloud::{CloudControl, Ec2Client};
use crate::config::ConfigHandle;
use crate::conversation::{
    ChatSettings, ContextBuilder, ConversationStore, RetentionSweeper, SqliteConversationStore,
};
use crate::disk::DiskUsage;
use crate::instances::{
    InstanceRecord, InstanceRegistry, PollReport, PollSettings, StatePoller, ToggleActuator,
    ToggleReport,
};
use crate::llm::{CompletionProvider, OpenAiProvider};
use crate::storage::Database;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// The wired-up bot: every core component over one shared database, driven
/// by the live config snapshot.
pub struct App {
    config: ConfigHandle,
    registry: InstanceRegistry,
    poller: StatePoller,
    toggler: ToggleActuator,
    context: ContextBuilder,
    sweeper: RetentionSweeper,
}

impl App {
    pub fn new(
        config: ConfigHandle,
        db: Database,
        cloud: Arc<dyn CloudControl>,
        provider: Arc<dyn CompletionProvider>,
    ) -> Self {
        let store: Arc<dyn ConversationStore> = Arc::new(SqliteConversationStore::new(db.clone()));
        Self {
            config,
            registry: InstanceRegistry::new(db.clone()),
            poller: StatePoller::new(db.clone(), Arc::clone(&cloud)),
            toggler: ToggleActuator::new(db, cloud),
            context: ContextBuilder::new(Arc::clone(&store), provider),
            sweeper: RetentionSweeper::new(store),
        }
    }

    /// Open the configured database, build the EC2 and OpenAI clients and
    /// reconcile the registry.
    pub async fn from_config(config: ConfigHandle) -> Result<Self> {
        let snapshot = config.load_full();
        let db_path = snapshot.storage.resolved_db_path();
        let db = Database::open(&db_path)
            .await
            .with_context(|| format!("Failed to open database {}", db_path.display()))?;

        let cloud: Arc<dyn CloudControl> = Arc::new(Ec2Client::from_config(&snapshot.ec2)?);
        let provider: Arc<dyn CompletionProvider> = Arc::new(OpenAiProvider::new(
            &snapshot.chat.api_key,
            &snapshot.chat.base_url,
            snapshot.chat.request_timeout(),
        ));

        let app = Self::new(config, db, cloud, provider);
        app.reconcile().await?;
        Ok(app)
    }

    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    /// Bring the registry in line with the configured instance list.
    pub async fn reconcile(&self) -> Result<()> {
        let config = self.config.load_full();
        self.registry.reconcile(&config.ec2.instances).await?;
        tracing::debug!(instances = config.ec2.instances.len(), "registry reconciled");
        Ok(())
    }

    pub async fn poll(&self, now: DateTime<Utc>) -> Result<PollReport> {
        let config = self.config.load_full();
        let settings = PollSettings::from_config(&config.ec2);
        self.poller.tick(&settings, now).await
    }

    pub async fn toggle(&self, names: &[String]) -> ToggleReport {
        let timeout = self.config.load().ec2.request_timeout();
        self.toggler.toggle_many(names, timeout).await
    }

    pub async fn chat(&self, text: &str) -> Result<String> {
        let settings = ChatSettings::from_config(&self.config.load_full().chat);
        self.context.exchange(&settings, text).await
    }

    /// Trim the conversation log to `keep`, or to the configured retention.
    pub async fn sweep(&self, keep: Option<usize>) -> Result<u64> {
        let keep = keep.unwrap_or_else(|| self.config.load().chat.retain);
        self.sweeper.sweep(keep).await
    }

    pub fn next_sweep(&self, from: DateTime<Utc>) -> Result<DateTime<Utc>> {
        RetentionSweeper::next_run(&self.config.load().chat.clean_schedule, from)
    }

    pub fn disk_usage(&self) -> Result<DiskUsage> {
        DiskUsage::measure(&self.config.load().disk.path)
    }

    pub async fn records(&self) -> Result<Vec<InstanceRecord>> {
        self.registry.all().await
    }
}
