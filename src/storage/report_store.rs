//! Month-keyed report history

use crate::error::{Result, SkillTrendsError};
use crate::output::report::{MonthlyAnalysisReport, ReportSummary};
use crate::processing::month::MonthKey;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

pub const REPORT_FILE_PREFIX: &str = "monthly_analysis_";
pub const INDEX_FILE: &str = "reports_index.json";

pub trait ReportStore: Send + Sync {
    fn save(&self, month: MonthKey, report: &MonthlyAnalysisReport) -> Result<()>;
    fn load(&self, month: MonthKey) -> Result<Option<MonthlyAnalysisReport>>;
    fn load_latest(&self) -> Result<Option<MonthlyAnalysisReport>>;
    fn list_months(&self) -> Result<BTreeSet<MonthKey>>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    #[serde(flatten)]
    pub summary: ReportSummary,
    pub storage_location: String,
}

/// Summary of every stored report, keyed by month
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportIndex {
    pub reports: BTreeMap<MonthKey, IndexEntry>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// One JSON file per month plus `reports_index.json` in a directory
pub struct FileReportStore {
    dir: PathBuf,
}

impl FileReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn report_path(&self, month: MonthKey) -> PathBuf {
        self.dir.join(format!("{}{}.json", REPORT_FILE_PREFIX, month))
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    pub fn index(&self) -> Result<ReportIndex> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(ReportIndex::default());
        }
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map_err(|e| SkillTrendsError::Storage(format!("Corrupt report index {}: {}", path.display(), e)))
    }

    fn update_index(&self, month: MonthKey, report: &MonthlyAnalysisReport, location: &Path) -> Result<()> {
        let mut index = self.index().unwrap_or_else(|e| {
            warn!("Rebuilding report index: {}", e);
            ReportIndex::default()
        });

        index.reports.insert(
            month,
            IndexEntry {
                summary: report.summary(),
                storage_location: location.display().to_string(),
            },
        );
        index.last_updated = Some(Utc::now());

        fs::write(self.index_path(), serde_json::to_string_pretty(&index)?)?;
        Ok(())
    }
}

impl ReportStore for FileReportStore {
    fn save(&self, month: MonthKey, report: &MonthlyAnalysisReport) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let path = self.report_path(month);
        fs::write(&path, serde_json::to_string_pretty(report)?)?;
        self.update_index(month, report, &path)?;

        info!("Saved report for {} to {}", month, path.display());
        Ok(())
    }

    fn load(&self, month: MonthKey) -> Result<Option<MonthlyAnalysisReport>> {
        let path = self.report_path(month);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let report = serde_json::from_str(&content)
            .map_err(|e| SkillTrendsError::Storage(format!("Corrupt report {}: {}", path.display(), e)))?;
        Ok(Some(report))
    }

    fn load_latest(&self) -> Result<Option<MonthlyAnalysisReport>> {
        match self.list_months()?.last() {
            Some(month) => self.load(*month),
            None => Ok(None),
        }
    }

    fn list_months(&self) -> Result<BTreeSet<MonthKey>> {
        let mut months = BTreeSet::new();
        if !self.dir.exists() {
            return Ok(months);
        }

        for entry in fs::read_dir(&self.dir)? {
            let name = entry?.file_name();
            let Some(name) = name.to_str() else { continue };
            let key = name
                .strip_prefix(REPORT_FILE_PREFIX)
                .and_then(|rest| rest.strip_suffix(".json"));
            match key.map(str::parse::<MonthKey>) {
                Some(Ok(month)) => {
                    months.insert(month);
                }
                Some(Err(_)) => debug!("Skipping unrecognized report file {}", name),
                None => {}
            }
        }

        Ok(months)
    }
}

/// Report store kept in memory
#[derive(Default)]
pub struct MemoryReportStore {
    reports: Mutex<BTreeMap<MonthKey, MonthlyAnalysisReport>>,
}

impl ReportStore for MemoryReportStore {
    fn save(&self, month: MonthKey, report: &MonthlyAnalysisReport) -> Result<()> {
        self.reports.lock().insert(month, report.clone());
        Ok(())
    }

    fn load(&self, month: MonthKey) -> Result<Option<MonthlyAnalysisReport>> {
        Ok(self.reports.lock().get(&month).cloned())
    }

    fn load_latest(&self) -> Result<Option<MonthlyAnalysisReport>> {
        Ok(self.reports.lock().values().next_back().cloned())
    }

    fn list_months(&self) -> Result<BTreeSet<MonthKey>> {
        Ok(self.reports.lock().keys().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::processing::analyzer::MonthlyAnalyzer;
    use crate::processing::statistics::SkillStatistics;
    use tempfile::tempdir;

    fn report(month: &str) -> MonthlyAnalysisReport {
        MonthlyAnalyzer::new(&AnalysisConfig::default())
            .unwrap()
            .generate_report(&SkillStatistics::default(), Some(month.parse().unwrap()))
    }

    #[test]
    fn test_file_store_round_trip_and_index() {
        let dir = tempdir().unwrap();
        let store = FileReportStore::new(dir.path().join("reports"));
        let january = report("2025-01");
        let march = report("2025-03");

        store.save(january.analysis_month, &january).unwrap();
        store.save(march.analysis_month, &march).unwrap();

        assert!(dir.path().join("reports/monthly_analysis_2025-01.json").exists());
        assert_eq!(store.load("2025-01".parse().unwrap()).unwrap(), Some(january));
        assert_eq!(store.load("2025-02".parse().unwrap()).unwrap(), None);
        assert_eq!(store.load_latest().unwrap(), Some(march));

        let months: Vec<String> = store.list_months().unwrap().iter().map(|m| m.to_string()).collect();
        assert_eq!(months, vec!["2025-01", "2025-03"]);

        let index = store.index().unwrap();
        assert_eq!(index.reports.len(), 2);
        let entry = &index.reports[&"2025-03".parse().unwrap()];
        assert!(entry.storage_location.ends_with("monthly_analysis_2025-03.json"));
        assert_eq!(entry.summary.total_documents, 0);
    }

    #[test]
    fn test_report_file_has_report_fields_only() {
        let dir = tempdir().unwrap();
        let store = FileReportStore::new(dir.path());
        let r = report("2025-02");
        store.save(r.analysis_month, &r).unwrap();

        let raw = fs::read_to_string(store.report_path(r.analysis_month)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["analysis_month"], "2025-02");
        assert_eq!(value["analysis_period"]["start"], "2025-02-01");
        assert_eq!(value["analysis_period"]["end"], "2025-02-28");
        assert!(value["skill_gap_analysis"]["balanced_skills"].is_array());
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempdir().unwrap();
        let store = FileReportStore::new(dir.path().join("missing"));
        assert!(store.list_months().unwrap().is_empty());
        assert_eq!(store.load_latest().unwrap(), None);
    }

    #[test]
    fn test_unrelated_files_are_ignored() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("monthly_analysis_latest.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        let store = FileReportStore::new(dir.path());
        assert!(store.list_months().unwrap().is_empty());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryReportStore::default();
        store.save("2024-12".parse().unwrap(), &report("2024-12")).unwrap();
        store.save("2025-01".parse().unwrap(), &report("2025-01")).unwrap();

        assert_eq!(store.list_months().unwrap().len(), 2);
        assert_eq!(
            store.load_latest().unwrap().map(|r| r.analysis_month.to_string()),
            Some("2025-01".to_string())
        );
    }
}
