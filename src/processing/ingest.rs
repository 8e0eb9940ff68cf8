//! Document ingestion: normalize, match, optionally ask the AI extractor, record

use crate::llm::extractor::{DisabledExtractor, SkillExtractor};
use crate::processing::document::{Document, DocumentInput};
use crate::processing::matcher::SkillMatcher;
use crate::processing::month::MonthKey;
use crate::processing::normalizer::normalize;
use crate::processing::statistics::SharedStatistics;
use log::{debug, info};
use std::collections::HashSet;

pub struct IngestService<E = DisabledExtractor> {
    matcher: SkillMatcher,
    extractor: E,
    statistics: SharedStatistics,
}

#[derive(Debug, Clone)]
pub struct IngestSummary {
    pub document: Document,
    pub bucket: MonthKey,
    pub replaced: bool,
}

impl IngestService<DisabledExtractor> {
    pub fn pattern_only(matcher: SkillMatcher, statistics: SharedStatistics) -> Self {
        Self::new(matcher, DisabledExtractor, statistics)
    }
}

impl<E: SkillExtractor> IngestService<E> {
    pub fn new(matcher: SkillMatcher, extractor: E, statistics: SharedStatistics) -> Self {
        Self {
            matcher,
            extractor,
            statistics,
        }
    }

    pub async fn ingest(&self, input: DocumentInput) -> IngestSummary {
        let text = normalize(&input.raw_text);
        let matched = self.matcher.match_normalized(&text);
        debug!("{}: {} catalog skills", input.id, matched.len());

        let mut document = Document::new(&input, matched);
        if !text.is_empty() {
            let extraction = self.extractor.extract(&input.raw_text, input.kind).await;
            let skills = self.canonical_skills(extraction.skills);
            document = document.with_ai_skills(skills, extraction.metadata);
        }

        let bucket = document.bucket();
        let outcome = self.statistics.record(document.clone());

        info!(
            "Ingested {} into {} ({} matched, {} AI skills{})",
            document.id,
            bucket,
            document.matched_skills.len(),
            document.ai_skills.len(),
            if outcome.replaced { ", replaced earlier upload" } else { "" }
        );

        IngestSummary {
            document,
            bucket,
            replaced: outcome.replaced,
        }
    }

    /// Catalog spelling for AI skills the catalog knows, duplicates dropped
    fn canonical_skills(&self, skills: Vec<String>) -> Vec<String> {
        let mut seen = HashSet::new();
        skills
            .into_iter()
            .map(|skill| match self.matcher.canonical(&skill) {
                Some(canonical) => canonical.to_string(),
                None => skill,
            })
            .filter(|skill| seen.insert(skill.clone()))
            .collect()
    }

    pub fn matcher(&self) -> &SkillMatcher {
        &self.matcher
    }

    pub fn statistics(&self) -> &SharedStatistics {
        &self.statistics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::extractor::{CompletionClient, LlmSkillExtractor};
    use crate::processing::catalog::SkillCatalog;
    use crate::processing::document::DocumentKind;
    use std::collections::BTreeSet;
    use std::sync::Arc;

    fn service() -> IngestService {
        let matcher = SkillMatcher::new(&SkillCatalog::builtin().unwrap()).unwrap();
        IngestService::pattern_only(matcher, SharedStatistics::default())
    }

    fn input(id: &str, date: &str, text: &str) -> DocumentInput {
        DocumentInput::from_iso(id, DocumentKind::Unknown, "2025-02-20T12:00:00Z", Some(date), text).unwrap()
    }

    #[tokio::test]
    async fn test_ingest_matches_and_records() {
        let service = service();
        let summary = service
            .ingest(input("dev_cv.pdf", "2025-01-15", "Python, python, PYTHON experience, also JS and react.js"))
            .await;

        let expected: BTreeSet<String> = ["JavaScript", "Python", "React"].iter().map(|s| s.to_string()).collect();
        assert_eq!(summary.document.matched_skills, expected);
        assert_eq!(summary.bucket.to_string(), "2025-01");
        assert!(!summary.replaced);

        let stats = service.statistics().snapshot();
        assert_eq!(stats.total_count("Python"), 1);
        assert_eq!(stats.count_in_month("React", summary.bucket), 1);
    }

    #[tokio::test]
    async fn test_empty_text_is_a_zero_skill_document() {
        let service = service();
        let summary = service.ingest(input("scan.pdf", "2025-01-15", "")).await;

        assert!(summary.document.matched_skills.is_empty());
        assert!(summary.document.ai_metadata.is_none());
        assert_eq!(service.statistics().snapshot().document_count(), 1);
    }

    #[tokio::test]
    async fn test_reupload_reconciles() {
        let service = service();
        service.ingest(input("job.pdf", "2025-01-15", "Docker and Kubernetes")).await;
        let summary = service.ingest(input("job.pdf", "2025-01-15", "Docker only")).await;

        assert!(summary.replaced);
        let stats = service.statistics().snapshot();
        assert_eq!(stats.total_count("Docker"), 1);
        assert_eq!(stats.total_count("Kubernetes"), 0);
    }

    struct FixedClient;

    impl CompletionClient for FixedClient {
        fn service(&self) -> &str {
            "fixed"
        }

        fn model(&self) -> &str {
            "fixed-1"
        }

        async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
            Ok(r#"["Airflow", "dbt", "JavaScript", "js"]"#.to_string())
        }
    }

    #[tokio::test]
    async fn test_ai_skills_are_attached_but_not_counted() {
        let matcher = SkillMatcher::new(&SkillCatalog::builtin().unwrap()).unwrap();
        let service = IngestService::new(matcher, LlmSkillExtractor::new(FixedClient, 4000), SharedStatistics::default());

        let summary = service.ingest(input("role.pdf", "2025-01-15", "Python pipelines")).await;

        assert_eq!(summary.document.ai_skills, vec!["Airflow", "Dbt", "JavaScript"]);
        assert_eq!(summary.document.ai_metadata.as_ref().map(|m| m.service.as_str()), Some("fixed"));
        let stats = service.statistics().snapshot();
        assert_eq!(stats.total_count("Python"), 1);
        assert_eq!(stats.total_count("Airflow"), 0);
    }

    #[tokio::test]
    async fn test_concurrent_ingestion() {
        let service = Arc::new(service());
        let mut handles = Vec::new();
        for n in 0..20 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service.ingest(input(&format!("doc{}.txt", n), "2025-01-10", "Rust and Docker")).await
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stats = service.statistics().snapshot();
        assert_eq!(stats.total_count("Rust"), 20);
        assert_eq!(stats.total_count("Docker"), 20);
        assert_eq!(stats.documents_for("Rust").len(), 20);
    }
}
