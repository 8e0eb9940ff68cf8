//! JSON persistence for skill statistics

use crate::error::{Result, SkillTrendsError};
use crate::processing::statistics::{ReuploadPolicy, SkillStatistics, STATISTICS_VERSION};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

pub struct StatisticsStore {
    path: PathBuf,
}

impl StatisticsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load statistics, starting empty when nothing has been saved yet
    pub fn load(&self, policy: ReuploadPolicy) -> Result<SkillStatistics> {
        if !self.path.exists() {
            info!("No statistics at {}, starting fresh", self.path.display());
            return Ok(SkillStatistics::new(policy));
        }

        let content = fs::read_to_string(&self.path)?;
        let mut stats: SkillStatistics = serde_json::from_str(&content).map_err(|e| {
            SkillTrendsError::Storage(format!("Corrupt statistics file {}: {}", self.path.display(), e))
        })?;

        if stats.version != STATISTICS_VERSION {
            warn!(
                "Statistics file version {} differs from {}, loading anyway",
                stats.version, STATISTICS_VERSION
            );
        }

        stats.set_reupload_policy(policy);
        Ok(stats)
    }

    /// Writes to a temporary file, then renames it over the target
    pub fn save(&self, stats: &SkillStatistics) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(stats)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
