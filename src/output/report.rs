//! Monthly analysis report structures

use crate::processing::month::MonthKey;
use crate::processing::skill_categories::SkillCategory;
use crate::processing::trends::SkillTrend;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything known about one calendar month of documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAnalysisReport {
    pub analysis_month: MonthKey,
    pub total_documents: usize,
    pub total_resumes: usize,
    pub total_job_descriptions: usize,

    /// Most mentioned skills with their share of all mentions in the month
    pub top_technical_skills: Vec<SkillShare>,
    pub top_soft_skills: Vec<SkillShare>,
    pub emerging_skills: Vec<SkillTrend>,
    pub declining_skills: Vec<SkillTrend>,
    pub comparison_month: MonthKey,

    pub ai_extraction_stats: AiExtractionStats,
    pub pattern_matching_stats: PatternMatchingStats,

    pub skill_gap_analysis: SkillGapAnalysis,
    pub soft_skills_trends: SoftSkillsTrends,
    pub technical_categories: TechnicalCategories,
    pub recommendations: Vec<String>,

    pub generated_at: DateTime<Utc>,
    pub analysis_period: AnalysisPeriod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillShare {
    pub skill: String,
    pub count: u64,
    /// Percentage of all skill mentions, rounded to two decimals
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCount {
    pub skill: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiExtractionStats {
    pub total_skills_extracted: u64,
    pub unique_skills: usize,
    pub avg_skills_per_document: f64,
    pub service_type: String,
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatchingStats {
    pub total_skills_extracted: u64,
    pub unique_skills: usize,
    pub avg_skills_per_document: f64,
}

/// Skills wanted by job descriptions vs skills offered by resumes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillGapAnalysis {
    pub high_demand_low_supply: Vec<String>,
    pub oversupplied_skills: Vec<String>,
    pub balanced_skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoftSkillsTrends {
    pub most_demanded: Vec<SkillCount>,
    pub total_soft_skills_mentions: u64,
    pub documents_with_soft_skills: usize,
    /// Soft skill mentions as a percentage of all mentions
    pub soft_skills_ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalCategories {
    pub categorized: BTreeMap<SkillCategory, Vec<SkillCount>>,
    pub uncategorized_technical: Vec<SkillCount>,
    /// Distinct non-soft skills seen in the month
    pub total_technical_skills: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AnalysisPeriod {
    pub fn for_month(month: MonthKey) -> Self {
        Self {
            start: month.first_day(),
            end: month.last_day(),
        }
    }
}

/// Headline numbers kept in the report history index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_documents: usize,
    pub total_resumes: usize,
    pub total_job_descriptions: usize,
    pub top_skill: Option<String>,
    pub emerging_count: usize,
    pub declining_count: usize,
    pub generated_at: DateTime<Utc>,
}

impl MonthlyAnalysisReport {
    pub fn is_empty(&self) -> bool {
        self.total_documents == 0
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            total_documents: self.total_documents,
            total_resumes: self.total_resumes,
            total_job_descriptions: self.total_job_descriptions,
            top_skill: self.top_technical_skills.first().map(|s| s.skill.clone()),
            emerging_count: self.emerging_skills.len(),
            declining_count: self.declining_skills.len(),
            generated_at: self.generated_at,
        }
    }
}

/// Percentage of `total` rounded to two decimals; zero totals give zero
pub fn percentage(count: u64, total: u64) -> f64 {
    round2(count as f64 / total.max(1) as f64 * 100.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(0, 0), 0.0);
    }

    #[test]
    fn test_analysis_period_covers_month() {
        let period = AnalysisPeriod::for_month("2024-02".parse().unwrap());
        assert_eq!(period.start.to_string(), "2024-02-01");
        assert_eq!(period.end.to_string(), "2024-02-29");
    }
}
