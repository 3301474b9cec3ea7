use arc_swap::ArcSwap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::Config;

/// Live-reloadable configuration holder.
///
/// Wraps `Config` in an `ArcSwap` so readers never block and a reload
/// atomically swaps the pointer. Periodic tasks and chat exchanges take a
/// fresh snapshot each time they run.
pub struct ConfigHandle {
    inner: Arc<ArcSwap<Config>>,
    path: PathBuf,
}

impl ConfigHandle {
    /// Create a new handle seeded with `config`.
    pub fn new(config: Config) -> Self {
        let path = config.config_path.clone();
        Self {
            inner: Arc::new(ArcSwap::from_pointee(config)),
            path,
        }
    }

    /// Load current config snapshot. Lock-free.
    pub fn load(&self) -> arc_swap::Guard<Arc<Config>> {
        self.inner.load()
    }

    /// Return a clone of the current `Arc<Config>`.
    pub fn load_full(&self) -> Arc<Config> {
        self.inner.load_full()
    }

    /// Reload config from disk, atomically swapping the active snapshot.
    ///
    /// On error the previous snapshot stays active.
    pub fn reload(&self) -> anyhow::Result<Arc<Config>> {
        let fresh = Arc::new(Config::load_from_path(&self.path)?);
        self.inner.store(Arc::clone(&fresh));
        tracing::info!(path = %self.path.display(), "config reloaded");
        Ok(fresh)
    }

    /// Manually swap in a new config.
    pub fn store(&self, config: Config) {
        self.inner.store(Arc::new(config));
    }

    /// Config file path being watched.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Clone for ConfigHandle {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            path: self.path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"
[telegram]
bot_token = "123:ABC"
recipient_id = 7

[ec2]
region = "us-east-1"

[chat]
api_key = "sk-test"
"#;

    #[test]
    fn config_handle_store_swaps_atomically() {
        let handle = ConfigHandle::new(Config::default());

        let mut updated = Config::default();
        updated.chat.temperature = 1.5;
        handle.store(updated);

        let snapshot = handle.load();
        assert!((snapshot.chat.temperature - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn config_handle_clone_shares_state() {
        let handle = ConfigHandle::new(Config::default());
        let clone = handle.clone();

        let mut updated = Config::default();
        updated.chat.system_prompt = "changed".into();
        handle.store(updated);

        assert_eq!(clone.load().chat.system_prompt, "changed");
    }

    #[test]
    fn reload_picks_up_file_changes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dbot.toml");
        std::fs::write(&path, MINIMAL).unwrap();
        let handle = ConfigHandle::new(Config::load_from_path(&path).unwrap());

        std::fs::write(
            &path,
            format!("{MINIMAL}\n[[ec2.instances]]\nname = \"web\"\nid = \"i-1\"\n")
                .replace("[chat]", "[chat]\nsystem_prompt = \"reloaded\""),
        )
        .unwrap();

        let fresh = handle.reload().unwrap();
        assert_eq!(fresh.ec2.instances.len(), 1);
        assert_eq!(handle.load().chat.system_prompt, "reloaded");
    }

    #[test]
    fn failed_reload_keeps_previous_snapshot() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dbot.toml");
        std::fs::write(&path, MINIMAL).unwrap();
        let handle = ConfigHandle::new(Config::load_from_path(&path).unwrap());

        std::fs::write(&path, "[telegram\n").unwrap();
        assert!(handle.reload().is_err());
        assert_eq!(handle.load().telegram.recipient_id, 7);
    }
}
