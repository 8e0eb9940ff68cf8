//! Input manager for handling different file types

use crate::error::{Result, SkillTrendsError};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor};
use crate::processing::document::{DocumentInput, DocumentKind};
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::Path;

pub struct InputManager {
    cache: HashMap<String, String>,
    enable_cache: bool,
}

/// Which date decides a document's month bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentDate {
    /// No file date; the upload time is used
    Upload,
    Fixed(NaiveDate),
    /// The file's modification date
    Modified,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        let key = path.to_string_lossy().to_string();

        if self.enable_cache {
            if let Some(cached) = self.cache.get(&key) {
                debug!("Using cached text for: {}", path.display());
                return Ok(cached.clone());
            }
        }

        if !path.exists() {
            return Err(SkillTrendsError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let text = match FileType::from_path(path) {
            FileType::Pdf => {
                info!("Extracting text from PDF: {}", path.display());
                PdfExtractor.extract(path).await?
            }
            FileType::Text => {
                info!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(path).await?
            }
            FileType::Markdown => {
                info!("Processing markdown file: {}", path.display());
                MarkdownExtractor.extract(path).await?
            }
            FileType::Unknown => {
                return Err(SkillTrendsError::UnsupportedFormat(format!(
                    "{} (supported: {})",
                    path.display(),
                    FileType::SUPPORTED_EXTENSIONS.join(", ")
                )));
            }
        };

        if self.enable_cache {
            self.cache.insert(key, text.clone());
        }

        Ok(text)
    }

    /// Decode a file into a document input named after the file.
    /// PDFs that cannot be decoded become documents without text.
    pub async fn load_document(&mut self, path: &Path, kind: DocumentKind, date: DocumentDate) -> Result<DocumentInput> {
        let id = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| SkillTrendsError::InvalidInput(format!("Not a file: {}", path.display())))?;

        let raw_text = match self.extract_text(path).await {
            Ok(text) => text,
            Err(SkillTrendsError::PdfExtraction(message)) => {
                warn!("{}; recording the document without text", message);
                String::new()
            }
            Err(e) => return Err(e),
        };

        let file_date = match date {
            DocumentDate::Upload => None,
            DocumentDate::Fixed(date) => Some(date),
            DocumentDate::Modified => Some(Self::modified_date(path).await?),
        };

        Ok(DocumentInput {
            id,
            kind,
            upload_timestamp: Utc::now().fixed_offset(),
            file_date,
            raw_text,
        })
    }

    /// Last modification date of the file, used as its document date when asked for
    pub async fn modified_date(path: &Path) -> Result<NaiveDate> {
        let modified = tokio::fs::metadata(path).await?.modified()?;
        Ok(DateTime::<Utc>::from(modified).date_naive())
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
