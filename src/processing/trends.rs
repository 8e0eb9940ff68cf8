//! Month-over-month trend detection and cumulative skill series

use crate::processing::month::MonthKey;
use crate::processing::statistics::SkillStatistics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A skill is new when it had no mentions last month and more than this many now
pub const NEW_SKILL_MIN_COUNT: u64 = 2;
pub const GROWTH_THRESHOLD_PERCENT: f64 = 50.0;
pub const DECLINE_THRESHOLD_PERCENT: f64 = -30.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillTrend {
    pub skill: String,
    pub count: u64,
    /// "NEW", "+X.X%" or "-X.X%"
    pub change: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub emerging_skills: Vec<SkillTrend>,
    pub declining_skills: Vec<SkillTrend>,
}

/// Compare this month's skill counts with last month's.
///
/// When the previous month has no documents at all there is nothing to compare
/// against and both lists come back empty.
pub fn detect_trends(
    current: &BTreeMap<String, u64>,
    previous: &BTreeMap<String, u64>,
    previous_documents: usize,
    limit: usize,
) -> TrendAnalysis {
    if previous_documents == 0 {
        return TrendAnalysis::default();
    }

    let mut emerging = Vec::new();
    let mut declining = Vec::new();

    for (skill, &count) in current {
        let before = previous.get(skill).copied().unwrap_or(0);

        if before == 0 {
            if count > NEW_SKILL_MIN_COUNT {
                emerging.push(SkillTrend {
                    skill: skill.clone(),
                    count,
                    change: "NEW".to_string(),
                });
            }
            continue;
        }

        let change = (count as f64 - before as f64) / before as f64 * 100.0;
        if change > GROWTH_THRESHOLD_PERCENT && count > before {
            emerging.push(SkillTrend {
                skill: skill.clone(),
                count,
                change: format!("+{:.1}%", change),
            });
        } else if change < DECLINE_THRESHOLD_PERCENT {
            declining.push(SkillTrend {
                skill: skill.clone(),
                count,
                change: format!("{:.1}%", change),
            });
        }
    }

    TrendAnalysis {
        emerging_skills: rank(emerging, limit),
        declining_skills: rank(declining, limit),
    }
}

fn rank(mut trends: Vec<SkillTrend>, limit: usize) -> Vec<SkillTrend> {
    trends.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.skill.cmp(&b.skill)));
    trends.truncate(limit);
    trends
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub label: String,
    pub data: Vec<u64>,
}

/// Running totals per month for the most mentioned skills
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartSeries>,
}

/// Cumulative monthly counts for the `top` skills by total count over the
/// `months` months ending at `end`. Skills without mentions in the window are left out.
pub fn cumulative_series(stats: &SkillStatistics, end: MonthKey, months: usize, top: usize) -> ChartData {
    let window = end.window(months);
    let labels = window.iter().map(MonthKey::label).collect();

    let datasets = stats
        .top_skills(top)
        .into_iter()
        .filter_map(|(skill, _)| {
            let mut running = 0;
            let data: Vec<u64> = window
                .iter()
                .map(|month| {
                    running += stats.count_in_month(&skill, *month);
                    running
                })
                .collect();
            (running > 0).then_some(ChartSeries { label: skill, data })
        })
        .collect();

    ChartData { labels, datasets }
}
