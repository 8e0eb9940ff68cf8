//! CLI interface for skill trends

use crate::config::OutputFormat;
use crate::processing::document::DocumentKind;
use crate::processing::month::MonthKey;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "skill-trends")]
#[command(about = "Skill extraction and monthly trend reports for resumes and job descriptions")]
#[command(long_about = "Match resumes and job descriptions against a skill catalog, keep per-month statistics, and generate monthly trend and skill-gap reports")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract skills from documents and record them in the statistics
    Ingest {
        /// Files to ingest (PDF, TXT, MD)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Declared document kind: resume, job, unknown
        #[arg(short, long, default_value = "unknown", value_parser = parse_document_kind)]
        kind: DocumentKind,

        /// Document date (YYYY-MM-DD) used for the month bucket
        #[arg(long, conflicts_with = "mtime")]
        file_date: Option<String>,

        /// Use each file's modification date as its document date
        #[arg(long)]
        mtime: bool,

        /// Skip AI extraction even when it is configured
        #[arg(long)]
        no_ai: bool,
    },

    /// Show which catalog skills a file mentions, without recording anything
    Scan {
        file: PathBuf,

        /// Show how each skill was found
        #[arg(short, long)]
        explain: bool,
    },

    /// Generate the monthly analysis report
    Report {
        /// Month to analyze (YYYY-MM); defaults to the previous month
        #[arg(short, long, value_parser = parse_month)]
        month: Option<MonthKey>,

        /// Output format: console, json, markdown
        #[arg(short, long, value_parser = parse_output_format)]
        output: Option<OutputFormat>,

        /// Include categories and extraction statistics
        #[arg(short, long)]
        detailed: bool,

        /// Also write the formatted report to this file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Print a previously stored report instead of generating one
        #[arg(long)]
        stored: bool,
    },

    /// List stored monthly reports
    History,

    /// Show accumulated skill statistics
    Stats {
        /// Number of top skills to show
        #[arg(short, long, default_value = "20")]
        top: usize,

        /// Show monthly counts and documents for one skill
        #[arg(short, long)]
        skill: Option<String>,
    },

    /// Cumulative per-month counts for the most mentioned skills
    Trends {
        /// Last month of the window (YYYY-MM); defaults to the current month
        #[arg(short, long, value_parser = parse_month)]
        end: Option<MonthKey>,

        /// Number of months in the window
        #[arg(short, long, default_value = "6")]
        months: usize,

        /// Number of skills to chart
        #[arg(short, long, default_value = "5")]
        top: usize,

        /// Print chart data as JSON
        #[arg(long)]
        json: bool,
    },

    /// List processed documents
    Documents {
        /// Only documents bucketed in this month (YYYY-MM)
        #[arg(short, long, value_parser = parse_month)]
        month: Option<MonthKey>,
    },

    /// Clear all accumulated statistics
    Reset {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, markdown", format)),
    }
}

pub fn parse_month(value: &str) -> Result<MonthKey, String> {
    value.parse().map_err(|e: crate::error::SkillTrendsError| e.to_string())
}

pub fn parse_document_kind(value: &str) -> Result<DocumentKind, String> {
    value.parse().map_err(|e: crate::error::SkillTrendsError| e.to_string())
}
