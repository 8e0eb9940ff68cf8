//! Document structures recorded by the aggregator

use crate::error::{Result, SkillTrendsError};
use crate::llm::extractor::ExtractionMetadata;
use crate::processing::month::MonthKey;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Resume,
    JobDescription,
    Unknown,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Resume => write!(f, "Resume"),
            DocumentKind::JobDescription => write!(f, "Job Description"),
            DocumentKind::Unknown => write!(f, "Unknown"),
        }
    }
}

impl FromStr for DocumentKind {
    type Err = SkillTrendsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "resume" | "cv" => Ok(DocumentKind::Resume),
            "job" | "job_description" | "job-description" | "jd" => Ok(DocumentKind::JobDescription),
            "unknown" | "" => Ok(DocumentKind::Unknown),
            other => Err(SkillTrendsError::InvalidInput(format!(
                "Unknown document kind: {}. Supported: resume, job, unknown",
                other
            ))),
        }
    }
}

/// One decoded document as handed to the core
#[derive(Debug, Clone)]
pub struct DocumentInput {
    pub id: String,
    pub kind: DocumentKind,
    pub upload_timestamp: DateTime<FixedOffset>,
    pub file_date: Option<NaiveDate>,
    pub raw_text: String,
}

impl DocumentInput {
    /// Build an input from ISO-8601 timestamps, validating them up front
    pub fn from_iso(
        id: impl Into<String>,
        kind: DocumentKind,
        upload_timestamp: &str,
        file_timestamp: Option<&str>,
        raw_text: impl Into<String>,
    ) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(SkillTrendsError::InvalidInput("document id must not be empty".to_string()));
        }

        Ok(Self {
            id,
            kind,
            upload_timestamp: parse_timestamp(upload_timestamp)?,
            file_date: file_timestamp.map(parse_date).transpose()?,
            raw_text: raw_text.into(),
        })
    }
}

/// A processed document: metadata plus the skills found in it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub kind: DocumentKind,
    pub upload_timestamp: DateTime<FixedOffset>,
    pub file_date: Option<NaiveDate>,
    pub matched_skills: BTreeSet<String>,
    #[serde(default)]
    pub ai_skills: Vec<String>,
    #[serde(default)]
    pub ai_metadata: Option<ExtractionMetadata>,
}

/// Cross-reference from a skill to a document that mentions it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub filename: String,
    pub upload_timestamp: DateTime<FixedOffset>,
    /// File date, or the upload date when the file carried none
    pub file_date: NaiveDate,
    pub kind: DocumentKind,
}

impl Document {
    pub fn new(input: &DocumentInput, matched_skills: BTreeSet<String>) -> Self {
        Self {
            id: input.id.clone(),
            kind: input.kind,
            upload_timestamp: input.upload_timestamp,
            file_date: input.file_date,
            matched_skills,
            ai_skills: Vec::new(),
            ai_metadata: None,
        }
    }

    pub fn with_ai_skills(mut self, skills: Vec<String>, metadata: ExtractionMetadata) -> Self {
        self.ai_skills = skills;
        self.ai_metadata = Some(metadata);
        self
    }

    /// File date when known, otherwise the upload date as written (no UTC shift)
    pub fn effective_date(&self) -> NaiveDate {
        self.file_date
            .unwrap_or_else(|| self.upload_timestamp.date_naive())
    }

    pub fn bucket(&self) -> MonthKey {
        MonthKey::from_date(self.effective_date())
    }

    pub fn reference(&self) -> DocumentRef {
        DocumentRef {
            filename: self.id.clone(),
            upload_timestamp: self.upload_timestamp,
            file_date: self.effective_date(),
            kind: self.kind,
        }
    }

    /// Pattern-matched skills followed by AI-extracted ones
    pub fn all_skills(&self) -> impl Iterator<Item = &String> {
        self.matched_skills.iter().chain(self.ai_skills.iter())
    }
}

/// Parse an ISO-8601 timestamp, keeping the offset it was written with.
/// Timestamps without an offset are taken as UTC, dates without a time at midnight.
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts);
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc().fixed_offset());
        }
    }
    Err(SkillTrendsError::InvalidTimestamp(value.to_string()))
}

/// Parse the date part of an ISO-8601 date or timestamp, as written
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    parse_timestamp(trimmed).map(|ts| ts.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(file_date: Option<&str>) -> DocumentInput {
        DocumentInput::from_iso(
            "backend_resume.pdf",
            DocumentKind::Resume,
            "2025-03-04T10:15:00Z",
            file_date,
            "Rust and Docker",
        )
        .unwrap()
    }

    #[test]
    fn test_bucket_prefers_file_date() {
        let doc = Document::new(&input(Some("2025-01-20")), BTreeSet::new());
        assert_eq!(doc.bucket().to_string(), "2025-01");
        assert_eq!(doc.reference().file_date.to_string(), "2025-01-20");
    }

    #[test]
    fn test_bucket_falls_back_to_upload_date() {
        let doc = Document::new(&input(None), BTreeSet::new());
        assert_eq!(doc.bucket().to_string(), "2025-03");
        assert_eq!(doc.reference().file_date.to_string(), "2025-03-04");
    }

    #[test]
    fn test_timestamp_formats() {
        assert!(parse_timestamp("2025-03-04T10:15:00+02:00").is_ok());
        assert!(parse_timestamp("2025-03-04 10:15:00").is_ok());
        assert!(parse_timestamp("2025-03-04").is_ok());
        assert!(matches!(
            parse_timestamp("04/03/2025"),
            Err(SkillTrendsError::InvalidTimestamp(_))
        ));
        assert_eq!(parse_date("2025-02-28T23:00:00Z").unwrap().to_string(), "2025-02-28");
        assert_eq!(parse_date("2025-02-01T00:30:00+02:00").unwrap().to_string(), "2025-02-01");
        assert_eq!(parse_date("2025-02-28T23:30:00-05:00").unwrap().to_string(), "2025-02-28");
    }

    #[test]
    fn test_offset_timestamps_bucket_by_written_date() {
        let with_file = DocumentInput::from_iso(
            "a.pdf",
            DocumentKind::Unknown,
            "2025-03-01T00:30:00+02:00",
            Some("2025-02-01T00:30:00+02:00"),
            "",
        )
        .unwrap();
        assert_eq!(Document::new(&with_file, BTreeSet::new()).bucket().to_string(), "2025-02");

        let upload_only =
            DocumentInput::from_iso("a.pdf", DocumentKind::Unknown, "2025-03-01T00:30:00+02:00", None, "").unwrap();
        let doc = Document::new(&upload_only, BTreeSet::new());
        assert_eq!(doc.bucket().to_string(), "2025-03");
        assert_eq!(doc.reference().file_date.to_string(), "2025-03-01");
    }

    #[test]
    fn test_document_kind_parsing() {
        assert_eq!("CV".parse::<DocumentKind>().unwrap(), DocumentKind::Resume);
        assert_eq!("jd".parse::<DocumentKind>().unwrap(), DocumentKind::JobDescription);
        assert!("memo".parse::<DocumentKind>().is_err());
    }

    #[test]
    fn test_empty_id_is_rejected() {
        let result = DocumentInput::from_iso(" ", DocumentKind::Unknown, "2025-01-01", None, "");
        assert!(matches!(result, Err(SkillTrendsError::InvalidInput(_))));
    }
}
