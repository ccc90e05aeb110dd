use crate::application::use_cases::requirement_extractor::extract_requirements;
use crate::application::use_cases::test_case_synthesis::{LocalSynthesizer, RemoteSynthesizer};
use crate::domain::app_config::AppConfig;
use crate::domain::error::Result;
use crate::domain::test_case::{GenerationMode, GenerationReport, ResultSet};
use crate::infrastructure::document;
use crate::infrastructure::llm_clients::LLMClient;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Extract requirements and run exactly one synthesis strategy over them.
pub struct GenerateTestCasesUseCase {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    config: AppConfig,
}

impl GenerateTestCasesUseCase {
    pub fn new(llm_client: Arc<dyn LLMClient + Send + Sync>, config: AppConfig) -> Self {
        Self { llm_client, config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn default_mode(&self) -> GenerationMode {
        self.config.mode
    }

    pub fn extract<S: AsRef<str>>(&self, paragraphs: &[S]) -> Vec<String> {
        let requirements = extract_requirements(paragraphs);
        info!(
            paragraphs = paragraphs.len(),
            requirements = requirements.len(),
            "Extracted requirements"
        );
        requirements
    }

    /// Synthesize test cases for already extracted requirements.
    ///
    /// Remote mode without a credential fails here, before any request is made.
    pub async fn execute(
        &self,
        requirements: &[String],
        mode: GenerationMode,
    ) -> Result<GenerationReport> {
        info!(mode = mode.as_str(), requirements = requirements.len(), "Generating test cases");

        let report = match mode {
            GenerationMode::Local => GenerationReport {
                result_set: ResultSet::new(
                    mode,
                    LocalSynthesizer::new().synthesize(requirements),
                ),
                skipped: Vec::new(),
            },
            GenerationMode::Remote => {
                let synthesizer = RemoteSynthesizer::new(
                    self.llm_client.clone(),
                    self.config.llm.clone(),
                    &self.config.remote,
                )?;
                let synthesis = synthesizer.synthesize(requirements).await;
                GenerationReport {
                    result_set: ResultSet::new(mode, synthesis.records),
                    skipped: synthesis.skipped,
                }
            }
        };

        Ok(report)
    }

    pub async fn execute_paragraphs<S: AsRef<str>>(
        &self,
        paragraphs: &[S],
        mode: GenerationMode,
    ) -> Result<GenerationReport> {
        let requirements = self.extract(paragraphs);
        self.execute(&requirements, mode).await
    }

    pub async fn execute_document(
        &self,
        path: &Path,
        mode: GenerationMode,
    ) -> Result<GenerationReport> {
        let paragraphs = document::load_paragraphs(path)?;
        self.execute_paragraphs(&paragraphs, mode).await
    }
}
