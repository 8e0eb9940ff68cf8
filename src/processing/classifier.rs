//! Resume vs job description classification

use crate::config::ClassifierKind;
use crate::error::{Result, SkillTrendsError};
use crate::processing::document::{Document, DocumentKind};
use aho_corasick::AhoCorasick;

const RESUME_INDICATORS: &[&str] = &["cv", "resume", "curriculum"];

/// Decides which side of the skill gap a document belongs to.
///
/// Implementations must answer with either `Resume` or `JobDescription`.
pub trait DocumentClassifier: Send + Sync {
    fn classify(&self, document: &Document) -> DocumentKind;

    fn is_resume(&self, document: &Document) -> bool {
        self.classify(document) == DocumentKind::Resume
    }
}

/// Filename heuristic: any of the resume indicators anywhere in the name
pub struct FilenameClassifier {
    indicators: AhoCorasick,
}

impl FilenameClassifier {
    pub fn new() -> Result<Self> {
        let indicators = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(RESUME_INDICATORS)
            .map_err(|e| SkillTrendsError::Configuration(format!("Failed to build filename classifier: {}", e)))?;

        Ok(Self { indicators })
    }

    pub fn classify_name(&self, filename: &str) -> DocumentKind {
        if self.indicators.is_match(filename) {
            DocumentKind::Resume
        } else {
            DocumentKind::JobDescription
        }
    }
}

impl DocumentClassifier for FilenameClassifier {
    fn classify(&self, document: &Document) -> DocumentKind {
        self.classify_name(&document.id)
    }
}

/// Trusts the kind given at ingestion, falling back to the filename for `Unknown`
pub struct DeclaredKindClassifier {
    fallback: FilenameClassifier,
}

impl DeclaredKindClassifier {
    pub fn new() -> Result<Self> {
        Ok(Self {
            fallback: FilenameClassifier::new()?,
        })
    }
}

impl DocumentClassifier for DeclaredKindClassifier {
    fn classify(&self, document: &Document) -> DocumentKind {
        match document.kind {
            DocumentKind::Unknown => self.fallback.classify(document),
            declared => declared,
        }
    }
}

pub fn classifier_for(kind: ClassifierKind) -> Result<Box<dyn DocumentClassifier>> {
    Ok(match kind {
        ClassifierKind::Filename => Box::new(FilenameClassifier::new()?),
        ClassifierKind::Declared => Box::new(DeclaredKindClassifier::new()?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::document::DocumentInput;
    use std::collections::BTreeSet;

    fn doc(id: &str, kind: DocumentKind) -> Document {
        let input = DocumentInput::from_iso(id, kind, "2025-01-05T08:00:00Z", None, "").unwrap();
        Document::new(&input, BTreeSet::new())
    }

    #[test]
    fn test_filename_indicators() {
        let classifier = FilenameClassifier::new().unwrap();
        assert_eq!(classifier.classify_name("Jane_Doe_CV.pdf"), DocumentKind::Resume);
        assert_eq!(classifier.classify_name("RESUME-2025.txt"), DocumentKind::Resume);
        assert_eq!(classifier.classify_name("curriculum_vitae.md"), DocumentKind::Resume);
        assert_eq!(classifier.classify_name("backend_engineer_posting.pdf"), DocumentKind::JobDescription);
    }

    #[test]
    fn test_filename_classifier_ignores_declared_kind() {
        let classifier = FilenameClassifier::new().unwrap();
        assert!(!classifier.is_resume(&doc("senior_dev.pdf", DocumentKind::Resume)));
    }

    #[test]
    fn test_declared_kind_wins_over_filename() {
        let classifier = DeclaredKindClassifier::new().unwrap();
        assert_eq!(
            classifier.classify(&doc("resume_template_job.pdf", DocumentKind::JobDescription)),
            DocumentKind::JobDescription
        );
        assert_eq!(
            classifier.classify(&doc("my_cv.pdf", DocumentKind::Unknown)),
            DocumentKind::Resume
        );
    }
}
