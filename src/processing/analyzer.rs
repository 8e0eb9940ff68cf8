//! Monthly analysis engine: month data, trends, skill gaps and recommendations

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::output::report::*;
use crate::processing::classifier::{classifier_for, DocumentClassifier};
use crate::processing::document::{Document, DocumentKind};
use crate::processing::month::MonthKey;
use crate::processing::skill_categories::{SkillCategorizer, SkillClass};
use crate::processing::statistics::{SharedStatistics, SkillStatistics};
use crate::processing::trends::detect_trends;
use crate::llm::extractor::DISABLED_SERVICE;
use crate::storage::report_store::ReportStore;
use chrono::{DateTime, Utc};
use log::{error, info};
use std::collections::{BTreeMap, BTreeSet};

pub const SOFT_SKILL_RATIO_THRESHOLD: f64 = 15.0;
pub const TECHNICAL_DIVERSITY_THRESHOLD: usize = 50;
pub const MIN_AI_SKILLS_PER_DOCUMENT: f64 = 5.0;
const GAP_RECOMMENDATION_SKILLS: usize = 5;
const MOST_DEMANDED_SOFT_SKILLS: usize = 5;
const UNCATEGORIZED_LIMIT: usize = 10;

/// Builds monthly reports from a statistics snapshot
pub struct MonthlyAnalyzer {
    classifier: Box<dyn DocumentClassifier>,
    categorizer: SkillCategorizer,
    settings: AnalysisConfig,
}

/// A generated report and whether the store accepted it
#[derive(Debug, Clone)]
pub struct StoredReport {
    pub report: MonthlyAnalysisReport,
    pub persisted: bool,
    pub error: Option<String>,
}

/// Documents of one month and their skill counters
#[derive(Debug, Default)]
struct MonthData<'a> {
    documents: Vec<&'a Document>,
    resumes: usize,
    job_descriptions: usize,
    pattern_skills: BTreeMap<String, u64>,
    ai_skills: BTreeMap<String, u64>,
    resume_skills: BTreeMap<String, u64>,
    job_skills: BTreeMap<String, u64>,
}

impl MonthData<'_> {
    /// Pattern and AI counters merged by summing
    fn combined(&self) -> BTreeMap<String, u64> {
        let mut all = self.pattern_skills.clone();
        for (skill, count) in &self.ai_skills {
            *all.entry(skill.clone()).or_insert(0) += count;
        }
        all
    }
}

impl MonthlyAnalyzer {
    pub fn new(settings: &AnalysisConfig) -> Result<Self> {
        Ok(Self {
            classifier: classifier_for(settings.classifier)?,
            categorizer: SkillCategorizer::new()?,
            settings: settings.clone(),
        })
    }

    pub fn with_classifier(mut self, classifier: Box<dyn DocumentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Report for `target`, or for the month before the current one
    pub fn generate_report(&self, stats: &SkillStatistics, target: Option<MonthKey>) -> MonthlyAnalysisReport {
        self.generate_report_at(stats, target, Utc::now())
    }

    pub fn generate_report_at(
        &self,
        stats: &SkillStatistics,
        target: Option<MonthKey>,
        now: DateTime<Utc>,
    ) -> MonthlyAnalysisReport {
        let month = target.unwrap_or_else(|| MonthKey::from_datetime(&now).previous());
        let comparison_month = month.previous();

        let data = self.month_data(stats, month);
        let previous = self.month_data(stats, comparison_month);

        let all_skills = data.combined();
        let total_mentions: u64 = all_skills.values().sum();

        let soft_skills: BTreeMap<String, u64> = all_skills
            .iter()
            .filter(|(skill, _)| self.categorizer.is_soft(skill))
            .map(|(skill, count)| (skill.clone(), *count))
            .collect();
        let soft_total: u64 = soft_skills.values().sum();

        let top_technical_skills = shares(&all_skills, self.settings.top_skills, total_mentions);
        let top_soft_skills = shares(&soft_skills, self.settings.top_soft_skills, total_mentions);

        let soft_skills_trends = SoftSkillsTrends {
            most_demanded: counts(&soft_skills, MOST_DEMANDED_SOFT_SKILLS),
            total_soft_skills_mentions: soft_total,
            documents_with_soft_skills: data
                .documents
                .iter()
                .filter(|doc| doc.all_skills().any(|s| self.categorizer.is_soft(s)))
                .count(),
            soft_skills_ratio: percentage(soft_total, total_mentions),
        };

        let technical_categories = self.categorize(&all_skills);
        let trends = detect_trends(
            &all_skills,
            &previous.combined(),
            previous.documents.len(),
            self.settings.trend_limit,
        );
        let skill_gap_analysis = skill_gaps(&data.resume_skills, &data.job_skills, self.settings.gap_top_n);

        let ai_extraction_stats = ai_stats(&data);
        let pattern_matching_stats = PatternMatchingStats {
            total_skills_extracted: data.pattern_skills.values().sum(),
            unique_skills: data.pattern_skills.len(),
            avg_skills_per_document: per_document(data.pattern_skills.values().sum(), data.documents.len()),
        };

        let recommendations = if data.documents.is_empty() {
            Vec::new()
        } else {
            recommendations(
                &skill_gap_analysis,
                soft_skills_trends.soft_skills_ratio,
                technical_categories.total_technical_skills,
                ai_extraction_stats.avg_skills_per_document,
            )
        };

        info!(
            "Analyzed {}: {} documents ({} resumes, {} job descriptions), {} distinct skills",
            month,
            data.documents.len(),
            data.resumes,
            data.job_descriptions,
            all_skills.len()
        );

        MonthlyAnalysisReport {
            analysis_month: month,
            total_documents: data.documents.len(),
            total_resumes: data.resumes,
            total_job_descriptions: data.job_descriptions,
            top_technical_skills,
            top_soft_skills,
            emerging_skills: trends.emerging_skills,
            declining_skills: trends.declining_skills,
            comparison_month,
            ai_extraction_stats,
            pattern_matching_stats,
            skill_gap_analysis,
            soft_skills_trends,
            technical_categories,
            recommendations,
            generated_at: now,
            analysis_period: AnalysisPeriod::for_month(month),
        }
    }

    /// Analyze a snapshot of `statistics` and hand the report to `store`.
    /// A failing store never loses the report.
    pub fn generate_and_store(
        &self,
        statistics: &SharedStatistics,
        target: Option<MonthKey>,
        store: &dyn ReportStore,
    ) -> StoredReport {
        let snapshot = statistics.snapshot();
        let report = self.generate_report(&snapshot, target);

        match store.save(report.analysis_month, &report) {
            Ok(()) => StoredReport {
                report,
                persisted: true,
                error: None,
            },
            Err(e) => {
                error!("Report for {} generated but not saved: {}", report.analysis_month, e);
                StoredReport {
                    report,
                    persisted: false,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    fn month_data<'a>(&self, stats: &'a SkillStatistics, month: MonthKey) -> MonthData<'a> {
        let mut data = MonthData::default();

        for doc in stats.documents_in(month) {
            let side = match self.classifier.classify(doc) {
                DocumentKind::Resume => {
                    data.resumes += 1;
                    &mut data.resume_skills
                }
                _ => {
                    data.job_descriptions += 1;
                    &mut data.job_skills
                }
            };
            for skill in doc.all_skills() {
                *side.entry(skill.clone()).or_insert(0) += 1;
            }

            for skill in &doc.matched_skills {
                *data.pattern_skills.entry(skill.clone()).or_insert(0) += 1;
            }
            for skill in &doc.ai_skills {
                *data.ai_skills.entry(skill.clone()).or_insert(0) += 1;
            }
            data.documents.push(doc);
        }

        data
    }

    fn categorize(&self, skills: &BTreeMap<String, u64>) -> TechnicalCategories {
        let mut categorized: BTreeMap<_, BTreeMap<String, u64>> = BTreeMap::new();
        let mut uncategorized = BTreeMap::new();
        let mut total_technical_skills = 0;

        for (skill, count) in skills {
            match self.categorizer.classify(skill) {
                SkillClass::Soft => continue,
                SkillClass::Technical(category) => {
                    categorized.entry(category).or_default().insert(skill.clone(), *count);
                }
                SkillClass::UncategorizedTechnical => {
                    uncategorized.insert(skill.clone(), *count);
                }
            }
            total_technical_skills += 1;
        }

        TechnicalCategories {
            categorized: categorized
                .into_iter()
                .map(|(category, skills)| (category, counts(&skills, usize::MAX)))
                .collect(),
            uncategorized_technical: counts(&uncategorized, UNCATEGORIZED_LIMIT),
            total_technical_skills,
        }
    }
}

/// Top `limit` skills of each side compared as sets, each list in count order
pub fn skill_gaps(
    resume_skills: &BTreeMap<String, u64>,
    job_skills: &BTreeMap<String, u64>,
    limit: usize,
) -> SkillGapAnalysis {
    let demand: Vec<String> = ranked(job_skills, limit).into_iter().map(|(s, _)| s).collect();
    let supply: Vec<String> = ranked(resume_skills, limit).into_iter().map(|(s, _)| s).collect();

    let demand_set: BTreeSet<&String> = demand.iter().collect();
    let supply_set: BTreeSet<&String> = supply.iter().collect();

    SkillGapAnalysis {
        high_demand_low_supply: demand.iter().filter(|s| !supply_set.contains(s)).cloned().collect(),
        oversupplied_skills: supply.iter().filter(|s| !demand_set.contains(s)).cloned().collect(),
        balanced_skills: demand.iter().filter(|s| supply_set.contains(s)).cloned().collect(),
    }
}

fn recommendations(
    gaps: &SkillGapAnalysis,
    soft_skills_ratio: f64,
    total_technical_skills: usize,
    ai_skills_per_document: f64,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if !gaps.high_demand_low_supply.is_empty() {
        let listed: Vec<&str> = gaps
            .high_demand_low_supply
            .iter()
            .take(GAP_RECOMMENDATION_SKILLS)
            .map(String::as_str)
            .collect();
        recommendations.push(format!("Skills in high demand but low supply: {}", listed.join(", ")));
    }

    if soft_skills_ratio < SOFT_SKILL_RATIO_THRESHOLD {
        recommendations.push("Consider emphasizing soft skills more in job requirements and resume reviews".to_string());
    }

    if total_technical_skills > TECHNICAL_DIVERSITY_THRESHOLD {
        recommendations.push("Diverse technical skill requirements suggest need for specialized roles".to_string());
    }

    if ai_skills_per_document < MIN_AI_SKILLS_PER_DOCUMENT {
        recommendations.push("Consider improving skill extraction accuracy or document quality".to_string());
    }

    recommendations
}

fn ai_stats(data: &MonthData<'_>) -> AiExtractionStats {
    let total: u64 = data.ai_skills.values().sum();
    let latest = data
        .documents
        .iter()
        .filter_map(|doc| doc.ai_metadata.as_ref().map(|meta| (doc.upload_timestamp, meta)))
        .max_by_key(|(uploaded, _)| *uploaded)
        .map(|(_, meta)| meta);

    AiExtractionStats {
        total_skills_extracted: total,
        unique_skills: data.ai_skills.len(),
        avg_skills_per_document: per_document(total, data.documents.len()),
        service_type: latest
            .map(|meta| meta.service.clone())
            .unwrap_or_else(|| DISABLED_SERVICE.to_string()),
        model: latest.and_then(|meta| meta.model.clone()),
    }
}

fn per_document(total: u64, documents: usize) -> f64 {
    round2(total as f64 / documents.max(1) as f64)
}

/// Count descending, then name ascending
fn ranked(counter: &BTreeMap<String, u64>, limit: usize) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64)> = counter.iter().map(|(s, c)| (s.clone(), *c)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(limit);
    entries
}

fn counts(counter: &BTreeMap<String, u64>, limit: usize) -> Vec<SkillCount> {
    ranked(counter, limit)
        .into_iter()
        .map(|(skill, count)| SkillCount { skill, count })
        .collect()
}

fn shares(counter: &BTreeMap<String, u64>, limit: usize, total: u64) -> Vec<SkillShare> {
    ranked(counter, limit)
        .into_iter()
        .map(|(skill, count)| SkillShare {
            percentage: percentage(count, total),
            skill,
            count,
        })
        .collect()
}
