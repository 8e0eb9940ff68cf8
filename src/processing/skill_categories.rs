//! Keyword-based grouping of skills into soft skills and technical categories

use crate::error::{Result, SkillTrendsError};
use aho_corasick::AhoCorasick;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Programming,
    WebDevelopment,
    Databases,
    Cloud,
    DataScience,
    Devops,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 6] = [
        SkillCategory::Programming,
        SkillCategory::WebDevelopment,
        SkillCategory::Databases,
        SkillCategory::Cloud,
        SkillCategory::DataScience,
        SkillCategory::Devops,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillCategory::Programming => "programming",
            SkillCategory::WebDevelopment => "web_development",
            SkillCategory::Databases => "databases",
            SkillCategory::Cloud => "cloud",
            SkillCategory::DataScience => "data_science",
            SkillCategory::Devops => "devops",
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            SkillCategory::Programming => &["python", "java", "javascript", "typescript", "c++", "c#", "go", "rust", "swift"],
            SkillCategory::WebDevelopment => &["react", "angular", "vue", "html", "css", "node.js", "express"],
            SkillCategory::Databases => &["sql", "postgresql", "mysql", "mongodb", "redis", "elasticsearch"],
            SkillCategory::Cloud => &["aws", "azure", "gcp", "docker", "kubernetes", "terraform"],
            SkillCategory::DataScience => &["pandas", "numpy", "tensorflow", "pytorch", "scikit-learn", "spark"],
            SkillCategory::Devops => &["jenkins", "git", "ci/cd", "ansible", "helm", "prometheus"],
        }
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const SOFT_SKILL_KEYWORDS: &[&str] = &[
    "communication", "leadership", "teamwork", "problem solving", "critical thinking",
    "creativity", "adaptability", "time management", "project management", "collaboration",
    "analytical thinking", "decision making", "conflict resolution", "emotional intelligence",
    "negotiation", "presentation", "mentoring", "strategic thinking", "innovation",
    "customer service", "interpersonal skills",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillClass {
    Soft,
    Technical(SkillCategory),
    UncategorizedTechnical,
}

impl SkillClass {
    pub fn is_soft(&self) -> bool {
        matches!(self, SkillClass::Soft)
    }
}

/// Classifies skill names by case-insensitive keyword substrings.
/// Soft-skill keywords are checked first, then categories in declaration order.
pub struct SkillCategorizer {
    soft: AhoCorasick,
    categories: Vec<(SkillCategory, AhoCorasick)>,
}

impl SkillCategorizer {
    pub fn new() -> Result<Self> {
        let soft = keyword_matcher(SOFT_SKILL_KEYWORDS)?;
        let categories = SkillCategory::ALL
            .iter()
            .map(|category| Ok((*category, keyword_matcher(category.keywords())?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { soft, categories })
    }

    pub fn classify(&self, skill: &str) -> SkillClass {
        if self.soft.is_match(skill) {
            return SkillClass::Soft;
        }

        self.categories
            .iter()
            .find(|(_, matcher)| matcher.is_match(skill))
            .map(|(category, _)| SkillClass::Technical(*category))
            .unwrap_or(SkillClass::UncategorizedTechnical)
    }

    pub fn is_soft(&self, skill: &str) -> bool {
        self.soft.is_match(skill)
    }
}

fn keyword_matcher(keywords: &[&str]) -> Result<AhoCorasick> {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(keywords)
        .map_err(|e| SkillTrendsError::Configuration(format!("Failed to build skill categorizer: {}", e)))
}
