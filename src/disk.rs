use anyhow::{Context, Result};
use std::path::Path;

/// Filesystem occupancy for one mount point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskUsage {
    pub total_bytes: u64,
    pub free_bytes: u64,
}

impl DiskUsage {
    pub fn measure(path: &Path) -> Result<Self> {
        let stats = fs2::statvfs(path)
            .with_context(|| format!("Failed to read filesystem stats for {}", path.display()))?;
        Ok(Self {
            total_bytes: stats.total_space(),
            free_bytes: stats.free_space(),
        })
    }

    /// Used share in percent, rounded to one decimal place.
    pub fn percent_used(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        let used = self.total_bytes.saturating_sub(self.free_bytes);
        #[allow(clippy::cast_precision_loss)]
        let percent = used as f64 / self.total_bytes as f64 * 100.0;
        (percent * 10.0).round() / 10.0
    }

    pub fn exceeds(&self, threshold: f64) -> bool {
        self.percent_used() >= threshold
    }
}
