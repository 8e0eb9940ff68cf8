//! Error handling for the skill trends engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkillTrendsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Skill catalog inconsistency: {0}")]
    CatalogInconsistency(String),

    #[error("Invalid month key: {0}")]
    InvalidMonth(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Pattern compilation error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Skill extraction error: {0}")]
    Extraction(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, SkillTrendsError>;

/// Convert anyhow errors coming from extraction backends
impl From<anyhow::Error> for SkillTrendsError {
    fn from(err: anyhow::Error) -> Self {
        SkillTrendsError::Extraction(err.to_string())
    }
}
