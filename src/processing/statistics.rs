//! Longitudinal skill statistics and the extraction aggregator

use crate::processing::document::{Document, DocumentRef};
use crate::processing::month::MonthKey;
use chrono::{DateTime, Utc};
use log::debug;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

pub const STATISTICS_VERSION: &str = "1.0";

/// What happens to earlier counts when a filename is uploaded again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReuploadPolicy {
    /// Withdraw the previous upload's counts before applying the new one
    #[default]
    Reconcile,
    /// Keep every upload's counts; only the document record is replaced
    Append,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOutcome {
    pub replaced: bool,
    pub skills_counted: usize,
}

/// Process-wide skill aggregate: totals, monthly buckets and document index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillStatistics {
    pub version: String,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    total_count: BTreeMap<String, u64>,
    #[serde(default)]
    monthly_count: BTreeMap<String, BTreeMap<MonthKey, u64>>,
    #[serde(default)]
    documents_by_skill: BTreeMap<String, Vec<DocumentRef>>,
    #[serde(default)]
    documents: BTreeMap<String, Document>,
    #[serde(skip)]
    policy: ReuploadPolicy,
}

impl Default for SkillStatistics {
    fn default() -> Self {
        Self::new(ReuploadPolicy::default())
    }
}

impl SkillStatistics {
    pub fn new(policy: ReuploadPolicy) -> Self {
        Self {
            version: STATISTICS_VERSION.to_string(),
            last_updated: None,
            total_count: BTreeMap::new(),
            monthly_count: BTreeMap::new(),
            documents_by_skill: BTreeMap::new(),
            documents: BTreeMap::new(),
            policy,
        }
    }

    pub fn set_reupload_policy(&mut self, policy: ReuploadPolicy) {
        self.policy = policy;
    }

    pub fn reupload_policy(&self) -> ReuploadPolicy {
        self.policy
    }

    /// Count one document: every matched skill moves its total and its
    /// monthly bucket by exactly one.
    pub fn record(&mut self, document: Document) -> RecordOutcome {
        let replaced = match self.policy {
            ReuploadPolicy::Reconcile => self.withdraw(&document.id),
            ReuploadPolicy::Append => self.documents.contains_key(&document.id),
        };

        let bucket = document.bucket();
        let reference = document.reference();

        for skill in &document.matched_skills {
            *self.total_count.entry(skill.clone()).or_insert(0) += 1;
            *self
                .monthly_count
                .entry(skill.clone())
                .or_default()
                .entry(bucket)
                .or_insert(0) += 1;
            self.documents_by_skill
                .entry(skill.clone())
                .or_default()
                .push(reference.clone());
        }

        let skills_counted = document.matched_skills.len();
        debug!(
            "Recorded {} ({} skills, bucket {}, replaced: {})",
            document.id, skills_counted, bucket, replaced
        );

        self.documents.insert(document.id.clone(), document);
        self.last_updated = Some(Utc::now());

        RecordOutcome {
            replaced,
            skills_counted,
        }
    }

    /// Remove a previously recorded document and its counts
    fn withdraw(&mut self, id: &str) -> bool {
        let Some(previous) = self.documents.remove(id) else {
            return false;
        };
        let bucket = previous.bucket();

        for skill in &previous.matched_skills {
            if let Some(total) = self.total_count.get_mut(skill) {
                *total = total.saturating_sub(1);
                if *total == 0 {
                    self.total_count.remove(skill);
                }
            }

            if let Some(months) = self.monthly_count.get_mut(skill) {
                if let Some(count) = months.get_mut(&bucket) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        months.remove(&bucket);
                    }
                }
                if months.is_empty() {
                    self.monthly_count.remove(skill);
                }
            }

            if let Some(refs) = self.documents_by_skill.get_mut(skill) {
                refs.retain(|r| r.filename != id);
                if refs.is_empty() {
                    self.documents_by_skill.remove(skill);
                }
            }
        }

        true
    }

    /// Clear all counters, indexes and documents
    pub fn reset(&mut self) {
        self.total_count.clear();
        self.monthly_count.clear();
        self.documents_by_skill.clear();
        self.documents.clear();
        self.last_updated = Some(Utc::now());
    }

    pub fn total_count(&self, skill: &str) -> u64 {
        self.total_count.get(skill).copied().unwrap_or(0)
    }

    pub fn total_counts(&self) -> &BTreeMap<String, u64> {
        &self.total_count
    }

    pub fn monthly_count(&self, skill: &str) -> Option<&BTreeMap<MonthKey, u64>> {
        self.monthly_count.get(skill)
    }

    pub fn count_in_month(&self, skill: &str, month: MonthKey) -> u64 {
        self.monthly_count
            .get(skill)
            .and_then(|months| months.get(&month))
            .copied()
            .unwrap_or(0)
    }

    pub fn documents_for(&self, skill: &str) -> &[DocumentRef] {
        self.documents_by_skill
            .get(skill)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn documents(&self) -> &BTreeMap<String, Document> {
        &self.documents
    }

    pub fn document(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn distinct_skills(&self) -> usize {
        self.total_count.len()
    }

    pub fn total_occurrences(&self) -> u64 {
        self.total_count.values().sum()
    }

    /// Skills by total count, highest first, ties by name
    pub fn top_skills(&self, limit: usize) -> Vec<(String, u64)> {
        let mut ranked: Vec<(String, u64)> = self
            .total_count
            .iter()
            .map(|(skill, count)| (skill.clone(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(limit);
        ranked
    }

    /// Months that have at least one recorded document
    pub fn months(&self) -> BTreeSet<MonthKey> {
        self.documents.values().map(Document::bucket).collect()
    }

    pub fn documents_in(&self, month: MonthKey) -> impl Iterator<Item = &Document> {
        self.documents.values().filter(move |doc| doc.bucket() == month)
    }
}

/// Statistics shared between writers; every `record` holds the write lock for
/// the whole document and readers work on cloned snapshots.
#[derive(Debug, Clone, Default)]
pub struct SharedStatistics {
    inner: Arc<RwLock<SkillStatistics>>,
}

impl SharedStatistics {
    pub fn new(statistics: SkillStatistics) -> Self {
        Self {
            inner: Arc::new(RwLock::new(statistics)),
        }
    }

    pub fn record(&self, document: Document) -> RecordOutcome {
        self.inner.write().record(document)
    }

    pub fn reset(&self) {
        self.inner.write().reset();
    }

    /// Point-in-time copy for report generation and persistence
    pub fn snapshot(&self) -> SkillStatistics {
        self.inner.read().clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&SkillStatistics) -> R) -> R {
        f(&self.inner.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::document::{DocumentInput, DocumentKind};

    fn doc(id: &str, file_date: &str, skills: &[&str]) -> Document {
        let input = DocumentInput::from_iso(id, DocumentKind::Unknown, "2025-06-01T09:00:00Z", Some(file_date), "").unwrap();
        Document::new(&input, skills.iter().map(|s| s.to_string()).collect())
    }

    fn month(key: &str) -> MonthKey {
        key.parse().unwrap()
    }

    #[test]
    fn test_docker_across_two_months() {
        let mut stats = SkillStatistics::default();
        stats.record(doc("a.pdf", "2025-01-10", &["Docker"]));
        stats.record(doc("b.pdf", "2025-02-10", &["Docker"]));

        assert_eq!(stats.total_count("Docker"), 2);
        let monthly = stats.monthly_count("Docker").unwrap();
        assert_eq!(monthly.get(&month("2025-01")), Some(&1));
        assert_eq!(monthly.get(&month("2025-02")), Some(&1));
        assert_eq!(monthly.len(), 2);
        assert_eq!(stats.documents_for("Docker").len(), 2);
    }

    #[test]
    fn test_offset_timestamps_count_in_their_written_month() {
        let mut stats = SkillStatistics::default();
        let dated = DocumentInput::from_iso(
            "a.pdf",
            DocumentKind::Unknown,
            "2025-03-01T00:30:00+02:00",
            Some("2025-02-01T00:30:00+02:00"),
            "",
        )
        .unwrap();
        let undated =
            DocumentInput::from_iso("b.pdf", DocumentKind::Unknown, "2025-03-01T00:30:00+02:00", None, "").unwrap();
        stats.record(Document::new(&dated, ["Docker".to_string()].into_iter().collect()));
        stats.record(Document::new(&undated, ["Docker".to_string()].into_iter().collect()));

        assert_eq!(stats.total_count("Docker"), 2);
        let monthly = stats.monthly_count("Docker").unwrap();
        assert_eq!(monthly.get(&month("2025-02")), Some(&1));
        assert_eq!(monthly.get(&month("2025-03")), Some(&1));
        assert_eq!(monthly.len(), 2);
    }

    #[test]
    fn test_reconcile_replaces_previous_upload() {
        let mut stats = SkillStatistics::new(ReuploadPolicy::Reconcile);
        stats.record(doc("cv.pdf", "2025-01-10", &["Rust", "Go"]));
        let outcome = stats.record(doc("cv.pdf", "2025-02-10", &["Rust", "Python"]));

        assert!(outcome.replaced);
        assert_eq!(stats.total_count("Rust"), 1);
        assert_eq!(stats.total_count("Go"), 0);
        assert_eq!(stats.total_count("Python"), 1);
        assert_eq!(stats.count_in_month("Rust", month("2025-01")), 0);
        assert_eq!(stats.count_in_month("Rust", month("2025-02")), 1);
        assert!(stats.monthly_count("Go").is_none());
        assert!(stats.documents_for("Go").is_empty());
        assert_eq!(stats.documents_for("Rust").len(), 1);
        assert_eq!(stats.document_count(), 1);
    }

    #[test]
    fn test_append_keeps_historical_counts() {
        let mut stats = SkillStatistics::new(ReuploadPolicy::Append);
        stats.record(doc("cv.pdf", "2025-01-10", &["Rust"]));
        let outcome = stats.record(doc("cv.pdf", "2025-01-12", &["Rust"]));

        assert!(outcome.replaced);
        assert_eq!(stats.total_count("Rust"), 2);
        assert_eq!(stats.document_count(), 1);
        assert_eq!(stats.documents_for("Rust").len(), 2);
    }

    #[test]
    fn test_monthly_cumulative_sums_never_decrease() {
        let mut stats = SkillStatistics::default();
        let uploads = [
            ("1.pdf", "2025-03-02"),
            ("2.pdf", "2025-01-15"),
            ("3.pdf", "2025-02-11"),
            ("4.pdf", "2025-01-30"),
            ("5.pdf", "2025-03-28"),
        ];
        let months = [month("2025-01"), month("2025-02"), month("2025-03")];
        let mut previous = vec![0u64; months.len()];

        for (id, date) in uploads {
            stats.record(doc(id, date, &["Kubernetes"]));
            let mut running = 0;
            for (idx, m) in months.iter().enumerate() {
                running += stats.count_in_month("Kubernetes", *m);
                assert!(running >= previous[idx]);
                previous[idx] = running;
            }
        }
        assert_eq!(previous[2], 5);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut stats = SkillStatistics::default();
        stats.record(doc("a.pdf", "2025-01-10", &["Docker", "AWS"]));
        stats.reset();

        assert_eq!(stats.distinct_skills(), 0);
        assert_eq!(stats.document_count(), 0);
        assert!(stats.monthly_count("Docker").is_none());
        assert!(stats.documents_for("AWS").is_empty());
    }

    #[test]
    fn test_top_skills_ordering() {
        let mut stats = SkillStatistics::default();
        stats.record(doc("a.pdf", "2025-01-10", &["Docker", "AWS", "Rust"]));
        stats.record(doc("b.pdf", "2025-01-11", &["Docker", "AWS"]));
        stats.record(doc("c.pdf", "2025-01-12", &["Docker"]));

        let top = stats.top_skills(2);
        assert_eq!(top, vec![("Docker".to_string(), 3), ("AWS".to_string(), 2)]);
        assert_eq!(stats.total_occurrences(), 6);
    }

    #[test]
    fn test_shared_statistics_concurrent_records() {
        let shared = SharedStatistics::default();
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    for n in 0..25 {
                        shared.record(doc(&format!("w{}-{}.pdf", worker, n), "2025-04-01", &["Python", "SQL"]));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = shared.snapshot();
        assert_eq!(snapshot.total_count("Python"), 200);
        assert_eq!(snapshot.count_in_month("SQL", month("2025-04")), 200);
        assert_eq!(snapshot.documents_for("Python").len(), 200);
        assert_eq!(snapshot.document_count(), 200);
    }

    #[test]
    fn test_serialized_shape() {
        let mut stats = SkillStatistics::default();
        stats.record(doc("a.pdf", "2025-01-10", &["Docker"]));
        let value = serde_json::to_value(&stats).unwrap();

        assert_eq!(value["version"], "1.0");
        assert_eq!(value["total_count"]["Docker"], 1);
        assert_eq!(value["monthly_count"]["Docker"]["2025-01"], 1);
        assert_eq!(value["documents_by_skill"]["Docker"][0]["filename"], "a.pdf");
    }
}
