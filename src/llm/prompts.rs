//! Prompt templates for AI skill extraction

use crate::processing::document::DocumentKind;

#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub resume: String,
    pub job_description: String,
    pub generic: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            resume: RESUME_TEMPLATE.to_string(),
            job_description: JOB_DESCRIPTION_TEMPLATE.to_string(),
            generic: GENERIC_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplates {
    /// Fill the template for `kind` with at most `max_chars` characters of the document
    pub fn render(&self, text: &str, kind: DocumentKind, max_chars: usize) -> String {
        let template = match kind {
            DocumentKind::Resume => &self.resume,
            DocumentKind::JobDescription => &self.job_description,
            DocumentKind::Unknown => &self.generic,
        };
        let excerpt: String = text.chars().take(max_chars).collect();
        template.replace("{text}", &excerpt)
    }
}

const RESUME_TEMPLATE: &str = r#"Extract every technical and professional skill mentioned in this resume.
Include programming languages, frameworks, tools, methodologies, certifications and soft skills.
The text may mix languages and contain PDF extraction artifacts.

<RESUME>
{text}
</RESUME>

Answer with a JSON array of skill names only, for example:
["Python", "React", "Docker", "Agile", "Communication"]

Rules:
- Use standard English skill names ("JavaScript", not "JS")
- Skip company names, job titles and locations
- Ignore corrupted text"#;

const JOB_DESCRIPTION_TEMPLATE: &str = r#"Extract every required and preferred skill from this job description.
Include technical skills, tools, frameworks, methodologies and soft skills.
The text may mix languages and contain PDF extraction artifacts.

<JOB POSTING>
{text}
</JOB POSTING>

Answer with a JSON array of skill names only, for example:
["Java", "Spring Boot", "Kubernetes", "Leadership", "Problem Solving"]

Rules:
- Use standard English skill names
- Skip company-specific terms, locations and salary information"#;

const GENERIC_TEMPLATE: &str = r#"Extract the professional skills, technologies and competencies mentioned in this text.

<TEXT>
{text}
</TEXT>

Answer with a JSON array of skill names only, for example:
["Skill1", "Skill2", "Skill3"]"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_picks_template_and_truncates() {
        let templates = PromptTemplates::default();
        let prompt = templates.render("ÆØÅ rust docker", DocumentKind::Resume, 8);

        assert!(prompt.contains("<RESUME>\nÆØÅ rust\n</RESUME>"));
        assert!(!prompt.contains("docker"));
        assert!(templates.render("x", DocumentKind::JobDescription, 10).contains("<JOB POSTING>"));
    }
}
