//! Output formatters for monthly reports

use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::report::*;
use crate::processing::trends::SkillTrend;
use colored::{Color, Colorize};
use std::fmt::Write as _;
use std::path::Path;

pub trait OutputFormatter {
    fn format_report(&self, report: &MonthlyAnalysisReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Terminal output with optional colors
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Picks the formatter for the requested output format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let (prefix, color) = match level {
            1 => ("█", Color::Blue),
            2 => ("▓", Color::Green),
            _ => ("▒", Color::Yellow),
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_trends(&self, out: &mut String, trends: &[SkillTrend], color: Color) {
        if trends.is_empty() {
            out.push_str("  (none)\n");
        }
        for trend in trends {
            let _ = writeln!(
                out,
                "  • {:<28} {:>5}  {}",
                trend.skill,
                trend.count,
                self.colorize(&trend.change, color)
            );
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &MonthlyAnalysisReport) -> Result<String> {
        let mut out = String::new();

        out.push_str(&self.format_header(
            &format!("📊 MONTHLY SKILL ANALYSIS {}", report.analysis_month),
            1,
        ));
        let _ = writeln!(
            out,
            "Period: {} to {} | Generated: {}",
            report.analysis_period.start,
            report.analysis_period.end,
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );

        out.push_str(&self.format_header("Overview", 2));
        let _ = writeln!(
            out,
            "Documents: {} ({} resumes, {} job descriptions)",
            report.total_documents, report.total_resumes, report.total_job_descriptions
        );
        let _ = writeln!(out, "Compared with: {}", report.comparison_month);

        if report.is_empty() {
            let _ = writeln!(
                out,
                "\n{}",
                self.colorize(&format!("No documents recorded for {}", report.analysis_month), Color::Yellow)
            );
            return Ok(out);
        }

        out.push_str(&self.format_header("Top Skills", 2));
        for (idx, share) in report.top_technical_skills.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {:>2}. {:<28} {:>5}  {:>6.2}%",
                idx + 1,
                share.skill,
                share.count,
                share.percentage
            );
        }

        out.push_str(&self.format_header(
            &format!("Soft Skills ({:.2}% of mentions)", report.soft_skills_trends.soft_skills_ratio),
            2,
        ));
        if report.top_soft_skills.is_empty() {
            out.push_str("  (none)\n");
        }
        for share in &report.top_soft_skills {
            let _ = writeln!(out, "  • {:<28} {:>5}  {:>6.2}%", share.skill, share.count, share.percentage);
        }

        out.push_str(&self.format_header("Emerging Skills", 2));
        self.format_trends(&mut out, &report.emerging_skills, Color::Green);
        out.push_str(&self.format_header("Declining Skills", 2));
        self.format_trends(&mut out, &report.declining_skills, Color::Red);

        out.push_str(&self.format_header("Skill Gaps", 2));
        let gaps = &report.skill_gap_analysis;
        for (label, skills, color) in [
            ("High demand, low supply", &gaps.high_demand_low_supply, Color::Red),
            ("Oversupplied", &gaps.oversupplied_skills, Color::Yellow),
            ("Balanced", &gaps.balanced_skills, Color::Green),
        ] {
            let list = if skills.is_empty() { "-".to_string() } else { skills.join(", ") };
            let _ = writeln!(out, "  {}: {}", self.colorize(label, color), list);
        }

        out.push_str(&self.format_header("Recommendations", 2));
        for recommendation in &report.recommendations {
            let _ = writeln!(out, "  💡 {}", recommendation);
        }

        if self.detailed {
            out.push_str(&self.format_header("Technical Categories", 3));
            for (category, skills) in &report.technical_categories.categorized {
                let names: Vec<String> = skills.iter().map(|s| format!("{} ({})", s.skill, s.count)).collect();
                let _ = writeln!(out, "  {}: {}", category, names.join(", "));
            }
            if !report.technical_categories.uncategorized_technical.is_empty() {
                let names: Vec<&str> = report
                    .technical_categories
                    .uncategorized_technical
                    .iter()
                    .map(|s| s.skill.as_str())
                    .collect();
                let _ = writeln!(out, "  other: {}", names.join(", "));
            }

            out.push_str(&self.format_header("Extraction", 3));
            let pattern = &report.pattern_matching_stats;
            let ai = &report.ai_extraction_stats;
            let _ = writeln!(
                out,
                "  Pattern matching: {} mentions, {} unique, {:.2} per document",
                pattern.total_skills_extracted, pattern.unique_skills, pattern.avg_skills_per_document
            );
            let _ = writeln!(
                out,
                "  AI ({}{}): {} mentions, {} unique, {:.2} per document",
                ai.service_type,
                ai.model.as_deref().map(|m| format!(" / {}", m)).unwrap_or_default(),
                ai.total_skills_extracted,
                ai.unique_skills,
                ai.avg_skills_per_document
            );
        }

        Ok(out)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &MonthlyAnalysisReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn trend_table(out: &mut String, trends: &[SkillTrend]) {
        if trends.is_empty() {
            out.push_str("_None_\n\n");
            return;
        }
        out.push_str("| Skill | Count | Change |\n|---|---:|---:|\n");
        for trend in trends {
            let _ = writeln!(out, "| {} | {} | {} |", trend.skill, trend.count, trend.change);
        }
        out.push('\n');
    }

    fn skill_list(skills: &[String]) -> String {
        if skills.is_empty() {
            "_none_".to_string()
        } else {
            skills.join(", ")
        }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &MonthlyAnalysisReport) -> Result<String> {
        let mut out = String::new();

        let _ = writeln!(out, "# Monthly Skill Analysis: {}\n", report.analysis_month.label());
        if self.include_metadata {
            let _ = writeln!(
                out,
                "_Period {} to {}, generated {}, compared with {}_\n",
                report.analysis_period.start,
                report.analysis_period.end,
                report.generated_at.format("%Y-%m-%d %H:%M UTC"),
                report.comparison_month
            );
        }

        out.push_str("## Overview\n\n");
        let _ = writeln!(out, "- **Documents:** {}", report.total_documents);
        let _ = writeln!(out, "- **Resumes:** {}", report.total_resumes);
        let _ = writeln!(out, "- **Job descriptions:** {}\n", report.total_job_descriptions);

        if report.is_empty() {
            out.push_str("No documents were recorded for this month.\n");
            return Ok(out);
        }

        out.push_str("## Top Skills\n\n| # | Skill | Count | Share |\n|---:|---|---:|---:|\n");
        for (idx, share) in report.top_technical_skills.iter().enumerate() {
            let _ = writeln!(out, "| {} | {} | {} | {:.2}% |", idx + 1, share.skill, share.count, share.percentage);
        }

        let _ = writeln!(
            out,
            "\n## Soft Skills\n\nSoft skills make up {:.2}% of all mentions ({} documents).\n",
            report.soft_skills_trends.soft_skills_ratio, report.soft_skills_trends.documents_with_soft_skills
        );
        for share in &report.top_soft_skills {
            let _ = writeln!(out, "- {} ({}, {:.2}%)", share.skill, share.count, share.percentage);
        }

        out.push_str("\n## Emerging Skills\n\n");
        Self::trend_table(&mut out, &report.emerging_skills);
        out.push_str("## Declining Skills\n\n");
        Self::trend_table(&mut out, &report.declining_skills);

        let gaps = &report.skill_gap_analysis;
        out.push_str("## Skill Gaps\n\n");
        let _ = writeln!(out, "- **High demand, low supply:** {}", Self::skill_list(&gaps.high_demand_low_supply));
        let _ = writeln!(out, "- **Oversupplied:** {}", Self::skill_list(&gaps.oversupplied_skills));
        let _ = writeln!(out, "- **Balanced:** {}\n", Self::skill_list(&gaps.balanced_skills));

        out.push_str("## Recommendations\n\n");
        for (idx, recommendation) in report.recommendations.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", idx + 1, recommendation);
        }

        Ok(out)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false, true, true)
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool, include_metadata: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
        }
    }

    pub fn generate_report(&self, report: &MonthlyAnalysisReport, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: &OutputFormat, report: &MonthlyAnalysisReport) -> String {
    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
    };
    format!("skill_report_{}.{}", report.analysis_month, extension)
}
