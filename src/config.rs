//! Configuration management for skill trends

use crate::error::{Result, SkillTrendsError};
use crate::processing::statistics::ReuploadPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub matching: MatchingConfig,
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub ai: AiConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub statistics_file: String,
    pub reports_dir: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Extra canonical skills appended to the built-in catalog
    #[serde(default)]
    pub custom_skills: Vec<String>,
    /// Extra alias -> canonical skill entries
    #[serde(default)]
    pub custom_aliases: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub classifier: ClassifierKind,
    pub reupload_policy: ReuploadPolicy,
    pub top_skills: usize,
    pub top_soft_skills: usize,
    pub trend_limit: usize,
    pub gap_top_n: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    /// Filename keywords ("cv", "resume", "curriculum")
    Filename,
    /// Declared document kind, falling back to filename keywords when unknown
    Declared,
}

/// Optional AI extraction through an external completion command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub enabled: bool,
    /// Program and arguments; the prompt is written to its stdin
    pub command: Vec<String>,
    pub model: String,
    pub max_input_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierKind::Filename,
            reupload_policy: ReuploadPolicy::Reconcile,
            top_skills: 20,
            top_soft_skills: 10,
            trend_limit: 10,
            gap_top_n: 20,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: Vec::new(),
            model: "local".to_string(),
            max_input_chars: 4000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skill-trends");

        Self {
            storage: StorageConfig {
                data_dir,
                statistics_file: "skill_statistics.json".to_string(),
                reports_dir: "monthly_reports".to_string(),
            },
            matching: MatchingConfig::default(),
            analysis: AnalysisConfig::default(),
            ai: AiConfig::default(),
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults on first run
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| SkillTrendsError::Configuration(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| SkillTrendsError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("skill-trends")
            .join("config.toml")
    }

    fn validate(&self) -> Result<()> {
        let analysis = &self.analysis;
        if analysis.top_skills == 0 || analysis.top_soft_skills == 0 || analysis.trend_limit == 0 || analysis.gap_top_n == 0 {
            return Err(SkillTrendsError::Configuration(
                "analysis limits must be greater than zero".to_string(),
            ));
        }
        if self.storage.statistics_file.trim().is_empty() {
            return Err(SkillTrendsError::Configuration(
                "storage.statistics_file must not be empty".to_string(),
            ));
        }
        if self.ai.enabled && self.ai.command.is_empty() {
            return Err(SkillTrendsError::Configuration(
                "ai.enabled requires ai.command".to_string(),
            ));
        }
        Ok(())
    }

    pub fn statistics_path(&self) -> PathBuf {
        self.storage.data_dir.join(&self.storage.statistics_file)
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.storage.data_dir.join(&self.storage.reports_dir)
    }

    pub fn ensure_data_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.storage.data_dir)?;
        Ok(())
    }
}
