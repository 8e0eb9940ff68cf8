//! Integration tests for skill trends

use skill_trends::config::AnalysisConfig;
use skill_trends::input::InputManager;
use skill_trends::processing::analyzer::MonthlyAnalyzer;
use skill_trends::processing::catalog::SkillCatalog;
use skill_trends::processing::document::{DocumentInput, DocumentKind};
use skill_trends::processing::ingest::IngestService;
use skill_trends::processing::matcher::SkillMatcher;
use skill_trends::processing::month::MonthKey;
use skill_trends::processing::statistics::{ReuploadPolicy, SharedStatistics};
use skill_trends::storage::report_store::{FileReportStore, ReportStore};
use skill_trends::storage::stats_store::StatisticsStore;
use skill_trends::SkillTrendsError;
use std::path::Path;
use tempfile::tempdir;

#[tokio::test]
async fn test_text_extraction_from_txt() {
    let mut manager = InputManager::new();
    let text = manager
        .extract_text(Path::new("tests/fixtures/sample_resume.txt"))
        .await
        .unwrap();

    assert!(text.contains("Jane Smith"));
    assert!(text.contains("Software Engineer"));
    assert!(text.contains("Node.js"));
}

#[tokio::test]
async fn test_text_extraction_from_markdown() {
    let mut manager = InputManager::new();
    let text = manager
        .extract_text(Path::new("tests/fixtures/sample_resume.md"))
        .await
        .unwrap();

    assert!(text.contains("Jane Smith"));
    assert!(text.contains("React"));
    assert!(text.contains("Node.js"));
    assert!(!text.contains("**"));
    assert!(!text.contains("##"));
}

#[tokio::test]
async fn test_caching_functionality() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/sample_resume.txt");

    let first = manager.extract_text(path).await.unwrap();
    assert_eq!(manager.cache_size(), 1);

    let second = manager.extract_text(path).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(manager.cache_size(), 1);

    manager.clear_cache();
    assert_eq!(manager.cache_size(), 0);
}

#[tokio::test]
async fn test_unsupported_file_type() {
    let mut manager = InputManager::new();
    let result = manager.extract_text(Path::new("tests/fixtures/unsupported.xyz")).await;
    assert!(matches!(result, Err(SkillTrendsError::UnsupportedFormat(_))));
}

#[tokio::test]
async fn test_nonexistent_file() {
    let mut manager = InputManager::new();
    let result = manager.extract_text(Path::new("tests/fixtures/nonexistent.txt")).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_markdown_and_text_resumes_match_the_same_core_skills() {
    let matcher = SkillMatcher::new(&SkillCatalog::builtin().unwrap()).unwrap();
    let mut manager = InputManager::new();

    let from_txt = matcher.match_text(
        &manager
            .extract_text(Path::new("tests/fixtures/sample_resume.txt"))
            .await
            .unwrap(),
    );
    let from_md = matcher.match_text(
        &manager
            .extract_text(Path::new("tests/fixtures/sample_resume.md"))
            .await
            .unwrap(),
    );

    for skill in ["Python", "React", "Node.js", "Docker", "Kubernetes", "AWS", "PostgreSQL", "Leadership"] {
        assert!(from_txt.contains(skill), "txt resume is missing {}", skill);
        assert!(from_md.contains(skill), "md resume is missing {}", skill);
    }
}

async fn ingest_fixture(service: &IngestService, manager: &mut InputManager, file: &str, date: &str) {
    let path = Path::new("tests/fixtures").join(file);
    let text = manager.extract_text(&path).await.unwrap();
    let input = DocumentInput::from_iso(file, DocumentKind::Unknown, "2025-03-01T09:00:00Z", Some(date), text).unwrap();
    service.ingest(input).await;
}

#[tokio::test]
async fn test_ingest_persist_and_report() {
    let dir = tempdir().unwrap();
    let stats_store = StatisticsStore::new(dir.path().join("skill_statistics.json"));
    let report_store = FileReportStore::new(dir.path().join("monthly_reports"));

    let matcher = SkillMatcher::new(&SkillCatalog::builtin().unwrap()).unwrap();
    let service = IngestService::pattern_only(matcher, SharedStatistics::default());
    let mut manager = InputManager::new();

    ingest_fixture(&service, &mut manager, "sample_resume.txt", "2025-01-20").await;
    ingest_fixture(&service, &mut manager, "sample_resume.md", "2025-02-03").await;
    ingest_fixture(&service, &mut manager, "data_engineer_job.md", "2025-02-11").await;
    stats_store.save(&service.statistics().snapshot()).unwrap();

    let reloaded = stats_store.load(ReuploadPolicy::Reconcile).unwrap();
    assert_eq!(reloaded.document_count(), 3);
    assert_eq!(reloaded.total_count("Python"), 3);
    assert_eq!(reloaded.count_in_month("Python", "2025-01".parse().unwrap()), 1);
    assert_eq!(reloaded.count_in_month("Python", "2025-02".parse().unwrap()), 2);

    let month: MonthKey = "2025-02".parse().unwrap();
    let analyzer = MonthlyAnalyzer::new(&AnalysisConfig::default()).unwrap();
    let stored = analyzer.generate_and_store(&SharedStatistics::new(reloaded), Some(month), &report_store);

    assert!(stored.persisted);
    let report = stored.report;
    assert_eq!(report.total_documents, 2);
    assert_eq!(report.total_resumes, 1);
    assert_eq!(report.total_job_descriptions, 1);
    assert_eq!(report.comparison_month.to_string(), "2025-01");
    assert_eq!(report.ai_extraction_stats.service_type, "None");

    let gaps = &report.skill_gap_analysis;
    assert!(gaps.high_demand_low_supply.contains(&"Terraform".to_string()));
    assert!(gaps.balanced_skills.contains(&"Python".to_string()));
    assert!(gaps.balanced_skills.contains(&"Kubernetes".to_string()));
    assert!(gaps.oversupplied_skills.contains(&"React".to_string()));

    assert!(report_store.report_path(month).exists());
    assert_eq!(report_store.load(month).unwrap(), Some(report.clone()));
    assert_eq!(report_store.list_months().unwrap().into_iter().collect::<Vec<_>>(), vec![month]);

    let index = report_store.index().unwrap();
    assert_eq!(index.reports[&month].summary.total_documents, 2);
}

#[tokio::test]
async fn test_reingesting_a_file_keeps_counts_stable() {
    let matcher = SkillMatcher::new(&SkillCatalog::builtin().unwrap()).unwrap();
    let service = IngestService::pattern_only(matcher, SharedStatistics::default());
    let mut manager = InputManager::new();

    ingest_fixture(&service, &mut manager, "data_engineer_job.md", "2025-02-11").await;
    let before = service.statistics().snapshot();
    ingest_fixture(&service, &mut manager, "data_engineer_job.md", "2025-02-11").await;
    let after = service.statistics().snapshot();

    assert_eq!(before.total_counts(), after.total_counts());
    assert_eq!(after.document_count(), 1);
    assert_eq!(after.documents_for("Terraform").len(), 1);
}
