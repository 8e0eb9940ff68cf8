//! AI skill extraction collaborators

use crate::config::AiConfig;
use crate::llm::prompts::PromptTemplates;
use crate::llm::response::parse_skill_response;
use crate::processing::document::DocumentKind;
use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

pub const DISABLED_SERVICE: &str = "None";

/// Provenance of an AI extraction, stored with each document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    pub service: String,
    pub model: Option<String>,
    pub extraction_method: String,
    pub document_type: DocumentKind,
    pub skill_count: usize,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AiExtraction {
    pub skills: Vec<String>,
    pub metadata: ExtractionMetadata,
}

/// Source of AI-extracted skills. Extraction never fails: problems are
/// reported through `metadata.error` together with an empty skill list.
pub trait SkillExtractor: Send + Sync {
    fn extract(&self, text: &str, kind: DocumentKind) -> impl Future<Output = AiExtraction> + Send;
}

/// Extractor used when no AI backend is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledExtractor;

impl SkillExtractor for DisabledExtractor {
    async fn extract(&self, _text: &str, kind: DocumentKind) -> AiExtraction {
        AiExtraction {
            skills: Vec::new(),
            metadata: ExtractionMetadata {
                service: DISABLED_SERVICE.to_string(),
                model: None,
                extraction_method: "none".to_string(),
                document_type: kind,
                skill_count: 0,
                timestamp: Utc::now(),
                error: None,
            },
        }
    }
}

/// Anything that can turn a prompt into a completion
pub trait CompletionClient: Send + Sync {
    fn service(&self) -> &str;
    fn model(&self) -> &str;
    fn complete(&self, prompt: &str) -> impl Future<Output = anyhow::Result<String>> + Send;
}

/// Prompts a completion backend and parses the answer into skills
pub struct LlmSkillExtractor<C> {
    client: C,
    templates: PromptTemplates,
    max_input_chars: usize,
}

impl<C: CompletionClient> LlmSkillExtractor<C> {
    pub fn new(client: C, max_input_chars: usize) -> Self {
        Self {
            client,
            templates: PromptTemplates::default(),
            max_input_chars,
        }
    }

    pub fn with_templates(mut self, templates: PromptTemplates) -> Self {
        self.templates = templates;
        self
    }
}

impl<C: CompletionClient> SkillExtractor for LlmSkillExtractor<C> {
    async fn extract(&self, text: &str, kind: DocumentKind) -> AiExtraction {
        let prompt = self.templates.render(text, kind, self.max_input_chars);

        let (skills, error) = match self.client.complete(&prompt).await {
            Ok(completion) => {
                let skills = parse_skill_response(&completion);
                debug!("{} returned {} skills", self.client.service(), skills.len());
                (skills, None)
            }
            Err(e) => {
                warn!("AI extraction via {} failed: {:#}", self.client.service(), e);
                (Vec::new(), Some(format!("{:#}", e)))
            }
        };

        AiExtraction {
            metadata: ExtractionMetadata {
                service: self.client.service().to_string(),
                model: Some(self.client.model().to_string()),
                extraction_method: "ai".to_string(),
                document_type: kind,
                skill_count: skills.len(),
                timestamp: Utc::now(),
                error,
            },
            skills,
        }
    }
}

/// Runs a local command, writing the prompt to stdin and reading the completion from stdout
pub struct CommandCompletionClient {
    program: String,
    args: Vec<String>,
    model: String,
    timeout: Duration,
}

impl CommandCompletionClient {
    pub fn from_config(config: &AiConfig) -> anyhow::Result<Self> {
        let Some((program, args)) = config.command.split_first() else {
            bail!("ai.command is empty");
        };

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            model: config.model.clone(),
            timeout: Duration::from_secs(120),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl CompletionClient for CommandCompletionClient {
    fn service(&self) -> &str {
        &self.program
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to start {}", self.program))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(prompt.as_bytes()).await.context("failed to write prompt")?;
        }

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .with_context(|| format!("{} timed out after {:?}", self.program, self.timeout))??;

        if !output.status.success() {
            bail!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct CannedClient(Result<String, String>);

    impl CompletionClient for CannedClient {
        fn service(&self) -> &str {
            "canned"
        }

        fn model(&self) -> &str {
            "test-model"
        }

        async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
            self.0.clone().map_err(|e| anyhow!(e))
        }
    }

    #[tokio::test]
    async fn test_disabled_extractor_returns_nothing() {
        let extraction = DisabledExtractor.extract("Rust", DocumentKind::Resume).await;
        assert!(extraction.skills.is_empty());
        assert_eq!(extraction.metadata.service, DISABLED_SERVICE);
        assert!(extraction.metadata.error.is_none());
    }

    #[tokio::test]
    async fn test_llm_extractor_parses_completion() {
        let extractor = LlmSkillExtractor::new(CannedClient(Ok(r#"["rust", "docker"]"#.to_string())), 4000);
        let extraction = extractor.extract("text", DocumentKind::JobDescription).await;

        assert_eq!(extraction.skills, vec!["Rust", "Docker"]);
        assert_eq!(extraction.metadata.skill_count, 2);
        assert_eq!(extraction.metadata.model.as_deref(), Some("test-model"));
        assert_eq!(extraction.metadata.document_type, DocumentKind::JobDescription);
    }

    #[tokio::test]
    async fn test_backend_error_is_folded_into_metadata() {
        let extractor = LlmSkillExtractor::new(CannedClient(Err("rate limited".to_string())), 4000);
        let extraction = extractor.extract("text", DocumentKind::Resume).await;

        assert!(extraction.skills.is_empty());
        assert_eq!(extraction.metadata.error.as_deref(), Some("rate limited"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_client_round_trip() {
        let config = AiConfig {
            enabled: true,
            command: vec!["cat".to_string()],
            model: "echo".to_string(),
            max_input_chars: 100,
        };
        let client = CommandCompletionClient::from_config(&config).unwrap();
        let completion = client.complete(r#"["Go"]"#).await.unwrap();
        assert_eq!(completion, r#"["Go"]"#);
    }

    #[test]
    fn test_command_client_requires_program() {
        assert!(CommandCompletionClient::from_config(&AiConfig::default()).is_err());
    }
}
