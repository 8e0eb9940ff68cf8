//! Skill trends: skill extraction and monthly trend reports for resumes and job descriptions

use chrono::Utc;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use skill_trends::cli::{Cli, Commands, ConfigAction};
use skill_trends::config::Config;
use skill_trends::error::{Result, SkillTrendsError};
use skill_trends::input::{DocumentDate, InputManager};
use skill_trends::llm::extractor::{CommandCompletionClient, LlmSkillExtractor, SkillExtractor};
use skill_trends::output::formatter::{save_report_to_file, ReportGenerator};
use skill_trends::processing::analyzer::MonthlyAnalyzer;
use skill_trends::processing::catalog::SkillCatalog;
use skill_trends::processing::document::{parse_date, DocumentKind};
use skill_trends::processing::ingest::IngestService;
use skill_trends::processing::matcher::SkillMatcher;
use skill_trends::processing::month::MonthKey;
use skill_trends::processing::statistics::{SharedStatistics, SkillStatistics};
use skill_trends::processing::trends::cumulative_series;
use skill_trends::storage::report_store::{FileReportStore, ReportStore};
use skill_trends::storage::stats_store::StatisticsStore;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if !config.output.color_output {
        colored::control::set_override(false);
    }

    if let Err(e) = run_command(cli.command, config, cli.config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Ingest {
            files,
            kind,
            file_date,
            mtime,
            no_ai,
        } => {
            let date = match (file_date.as_deref().map(parse_date).transpose()?, mtime) {
                (Some(date), _) => DocumentDate::Fixed(date),
                (None, true) => DocumentDate::Modified,
                (None, false) => DocumentDate::Upload,
            };
            let matcher = SkillMatcher::new(&SkillCatalog::with_custom(&config.matching)?)?;

            config.ensure_data_dir()?;
            let store = StatisticsStore::new(config.statistics_path());
            let statistics = SharedStatistics::new(store.load(config.analysis.reupload_policy)?);
            let options = IngestOptions { kind, date };

            let failed = if config.ai.enabled && !no_ai {
                let client = CommandCompletionClient::from_config(&config.ai)?;
                info!("AI extraction through {}", config.ai.command.join(" "));
                let extractor = LlmSkillExtractor::new(client, config.ai.max_input_chars);
                let service = IngestService::new(matcher, extractor, statistics.clone());
                ingest_files(&service, &files, &options).await?
            } else {
                let service = IngestService::pattern_only(matcher, statistics.clone());
                ingest_files(&service, &files, &options).await?
            };

            store.save(&statistics.snapshot())?;
            println!("💾 Statistics saved to {}", store.path().display());

            if failed > 0 {
                return Err(SkillTrendsError::InvalidInput(format!(
                    "{} of {} files could not be ingested",
                    failed,
                    files.len()
                )));
            }
        }

        Commands::Scan { file, explain } => {
            let matcher = SkillMatcher::new(&SkillCatalog::with_custom(&config.matching)?)?;
            let text = InputManager::new().extract_text(&file).await?;

            println!("🔍 {} ({} characters)", file.display(), text.chars().count());
            if explain {
                let hits = matcher.explain(&text);
                println!("Found {} skills:\n", hits.len());
                for hit in hits {
                    let via = hit.via.map(|alias| format!(" via '{}'", alias)).unwrap_or_default();
                    println!("  • {} [{:?}{}]", hit.skill.bold(), hit.strategy, via);
                    println!("    …{}…", hit.context.dimmed());
                }
            } else {
                let skills = matcher.match_text(&text);
                println!("Found {} skills:", skills.len());
                for skill in skills {
                    println!("  • {}", skill);
                }
            }
        }

        Commands::Report {
            month,
            output,
            detailed,
            save,
            stored,
        } => {
            let format = output.unwrap_or(config.output.format);
            let detailed = detailed || config.output.detailed;
            let report_store = FileReportStore::new(config.reports_dir());

            let report = if stored {
                let report = match month {
                    Some(month) => report_store.load(month)?,
                    None => report_store.load_latest()?,
                };
                report.ok_or_else(|| SkillTrendsError::InvalidInput("No stored report found".to_string()))?
            } else {
                let statistics = load_statistics(&config)?;
                let analyzer = MonthlyAnalyzer::new(&config.analysis)?;
                let result = analyzer.generate_and_store(&SharedStatistics::new(statistics), month, &report_store);

                if result.persisted {
                    info!(
                        "Report for {} stored at {}",
                        result.report.analysis_month,
                        report_store.report_path(result.report.analysis_month).display()
                    );
                } else {
                    warn!(
                        "Report generated but not saved: {}",
                        result.error.as_deref().unwrap_or("unknown error")
                    );
                }
                result.report
            };

            let generator = ReportGenerator::with_options(config.output.color_output, detailed, true, true);
            println!("{}", generator.generate_report(&report, &format)?);

            if let Some(path) = save {
                let plain = ReportGenerator::with_options(false, detailed, true, true);
                save_report_to_file(&plain.generate_report(&report, &format)?, &path)?;
                println!("💾 Report written to {}", path.display());
            }
        }

        Commands::History => {
            let report_store = FileReportStore::new(config.reports_dir());
            let index = report_store.index()?;

            if index.reports.is_empty() {
                println!("No stored reports in {}", report_store.dir().display());
                return Ok(());
            }

            println!("📚 Stored monthly reports\n");
            for (month, entry) in index.reports.iter().rev() {
                let summary = &entry.summary;
                println!(
                    "  {}  {:>4} docs ({} resumes, {} jobs)  top: {:<16} +{} / -{}  {}",
                    month.to_string().bold(),
                    summary.total_documents,
                    summary.total_resumes,
                    summary.total_job_descriptions,
                    summary.top_skill.as_deref().unwrap_or("-"),
                    summary.emerging_count,
                    summary.declining_count,
                    summary.generated_at.format("%Y-%m-%d %H:%M")
                );
            }
        }

        Commands::Stats { top, skill } => {
            let catalog = SkillCatalog::with_custom(&config.matching)?;
            let statistics = load_statistics(&config)?;

            match skill {
                Some(name) => {
                    let name = catalog.canonical(&name).map(str::to_string).unwrap_or(name);
                    print_skill(&statistics, &name);
                }
                None => {
                    println!("📊 Skill statistics\n");
                    println!("Catalog skills:        {}", catalog.len());
                    println!("Skills found:          {}", statistics.distinct_skills());
                    println!("Documents processed:   {}", statistics.document_count());
                    println!("Total occurrences:     {}", statistics.total_occurrences());
                    if let Some(updated) = statistics.last_updated {
                        println!("Last updated:          {}", updated.format("%Y-%m-%d %H:%M:%S UTC"));
                    }

                    println!("\n🏆 Top skills");
                    for (idx, (skill, count)) in statistics.top_skills(top).iter().enumerate() {
                        println!("  {:>2}. {:<28} {:>5}", idx + 1, skill, count);
                    }
                }
            }
        }

        Commands::Trends { end, months, top, json } => {
            if months == 0 {
                return Err(SkillTrendsError::InvalidInput("--months must be at least 1".to_string()));
            }
            let statistics = load_statistics(&config)?;
            let end = end.unwrap_or_else(|| MonthKey::from_datetime(&Utc::now()));
            let chart = cumulative_series(&statistics, end, months, top);

            if json {
                println!("{}", serde_json::to_string_pretty(&chart)?);
                return Ok(());
            }

            println!("📈 Cumulative mentions, {} to {}\n", end.window(months)[0], end);
            print!("  {:<24}", "");
            for label in &chart.labels {
                print!("{:>10}", label);
            }
            println!();
            for series in &chart.datasets {
                print!("  {:<24}", series.label);
                for value in &series.data {
                    print!("{:>10}", value);
                }
                println!();
            }
            if chart.datasets.is_empty() {
                println!("  No skill mentions in this window");
            }
        }

        Commands::Documents { month } => {
            let statistics = load_statistics(&config)?;
            let documents: Vec<_> = match month {
                Some(month) => statistics.documents_in(month).collect(),
                None => statistics.documents().values().collect(),
            };

            println!("📄 {} processed documents\n", documents.len());
            for doc in documents {
                println!(
                    "  {:<36} {:<16} {}  {:>3} matched  {:>3} AI  uploaded {}",
                    doc.id,
                    doc.kind.to_string(),
                    doc.bucket(),
                    doc.matched_skills.len(),
                    doc.ai_skills.len(),
                    doc.upload_timestamp.format("%Y-%m-%d %H:%M")
                );
            }
        }

        Commands::Reset { yes } => {
            let store = StatisticsStore::new(config.statistics_path());
            if !yes && !confirm(&format!("Clear all statistics in {}?", store.path().display()))? {
                println!("Aborted");
                return Ok(());
            }

            store.save(&SkillStatistics::new(config.analysis.reupload_policy))?;
            println!("🗑️  Statistics cleared");
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("⚙️  Current Configuration\n");
                println!("Data Directory: {}", config.storage.data_dir.display());
                println!("Statistics File: {}", config.statistics_path().display());
                println!("Reports Directory: {}", config.reports_dir().display());
                println!("\nMatching:");
                println!("  Custom skills: {}", config.matching.custom_skills.len());
                println!("  Custom aliases: {}", config.matching.custom_aliases.len());
                println!("\nAnalysis:");
                println!("  Classifier: {:?}", config.analysis.classifier);
                println!("  Re-upload policy: {:?}", config.analysis.reupload_policy);
                println!("  Top skills: {}", config.analysis.top_skills);
                println!("  Trend limit: {}", config.analysis.trend_limit);
                println!("\nAI Extraction: {}", if config.ai.enabled { "enabled" } else { "disabled" });
                if config.ai.enabled {
                    println!("  Command: {}", config.ai.command.join(" "));
                    println!("  Model: {}", config.ai.model);
                }
                println!("\nOutput Format: {:?}", config.output.format);
            }

            Some(ConfigAction::Reset) => {
                println!("🔄 Resetting configuration to defaults...");
                let default_config = Config::default();
                match &config_path {
                    Some(path) => default_config.save_to(path)?,
                    None => default_config.save()?,
                }
                println!("✅ Configuration reset successfully!");
            }

            Some(ConfigAction::Path) => {
                println!("{}", config_path.unwrap_or_else(Config::config_path).display());
            }
        },
    }

    Ok(())
}

struct IngestOptions {
    kind: DocumentKind,
    date: DocumentDate,
}

/// Ingest every file, returning how many could not be read
async fn ingest_files<E: SkillExtractor>(
    service: &IngestService<E>,
    files: &[PathBuf],
    options: &IngestOptions,
) -> Result<usize> {
    let mut input_manager = InputManager::new().with_cache(false);
    let progress = if files.len() > 1 {
        let bar = ProgressBar::new(files.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
                .map_err(|e| SkillTrendsError::OutputFormatting(e.to_string()))?
                .progress_chars("=> "),
        );
        Some(bar)
    } else {
        None
    };

    let mut failed = 0;
    for path in files {
        if let Some(bar) = &progress {
            bar.set_message(path.display().to_string());
        }

        let line = match ingest_file(service, &mut input_manager, path, options).await {
            Ok(line) => line,
            Err(e) => {
                failed += 1;
                format!("❌ {}: {}", path.display(), e).red().to_string()
            }
        };

        match &progress {
            Some(bar) => {
                bar.println(line);
                bar.inc(1);
            }
            None => println!("{}", line),
        }
    }

    if let Some(bar) = progress {
        bar.finish_with_message("done");
    }
    Ok(failed)
}

async fn ingest_file<E: SkillExtractor>(
    service: &IngestService<E>,
    input_manager: &mut InputManager,
    path: &Path,
    options: &IngestOptions,
) -> Result<String> {
    let input = input_manager.load_document(path, options.kind, options.date).await?;
    let summary = service.ingest(input).await;

    let document = &summary.document;
    let mut line = format!(
        "📄 {} → {} ({} skills",
        document.id.bold(),
        summary.bucket,
        document.matched_skills.len()
    );
    if !document.ai_skills.is_empty() {
        line.push_str(&format!(", {} from AI", document.ai_skills.len()));
    }
    line.push(')');
    if summary.replaced {
        line.push_str(&" replaced earlier upload".yellow().to_string());
    }
    Ok(line)
}

fn load_statistics(config: &Config) -> Result<SkillStatistics> {
    StatisticsStore::new(config.statistics_path()).load(config.analysis.reupload_policy)
}

fn print_skill(statistics: &SkillStatistics, skill: &str) {
    let total = statistics.total_count(skill);
    println!("📌 {}: {} documents\n", skill.bold(), total);

    if let Some(months) = statistics.monthly_count(skill) {
        for (month, count) in months {
            println!("  {}  {:>5}", month, count);
        }
    }

    let references = statistics.documents_for(skill);
    if !references.is_empty() {
        println!("\nDocuments:");
        for reference in references {
            println!("  • {} ({}, {})", reference.filename, reference.kind, reference.file_date);
        }
    }
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
