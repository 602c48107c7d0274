use async_trait::async_trait;
use log::{error, info};
use thiserror::Error;

use crate::ai_client::{AiClient, AiModel};
use crate::prompts;
use crate::schema::{self, AnalysisResult, ImprovementTips};

/// The only two errors that ever cross the service boundary. Everything the
/// backend can do wrong (network, timeout, rate limit, malformed reply,
/// schema violation) collapses into `AnalysisFailed`; the cause is logged
/// here and never shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Text cannot be empty.")]
    InvalidInput,
    #[error("Failed to get analysis from AI.")]
    AnalysisFailed,
}

/// Seam between the analysis pipeline and whatever produces completions.
/// Production uses `AiClient`; tests script replies.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: &AiModel,
    ) -> anyhow::Result<String>;
}

#[async_trait]
impl CompletionBackend for AiClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: &AiModel,
    ) -> anyhow::Result<String> {
        AiClient::complete(self, system_prompt, user_prompt, model).await
    }
}

/// Orchestrates one analysis run: validate input, render the prompt, call
/// the model, parse the labeled reply, schema-check it. One attempt only;
/// the caller decides whether to resubmit.
pub struct AnalysisService<B: CompletionBackend> {
    backend: B,
    model: AiModel,
}

impl<B: CompletionBackend> AnalysisService<B> {
    pub fn new(backend: B, model: AiModel) -> Self {
        Self { backend, model }
    }

    pub async fn analyze(&self, text: &str) -> Result<AnalysisResult, AnalysisError> {
        schema::validate_request(text).map_err(|_| AnalysisError::InvalidInput)?;

        let prompt = prompts::analysis_prompt(text);
        let reply = self
            .backend
            .complete(prompts::SYSTEM_PROMPT, &prompt, &self.model)
            .await
            .map_err(|e| {
                error!("❌ Analysis model call failed: {:#}", e);
                AnalysisError::AnalysisFailed
            })?;

        let value = prompts::parse_analysis_reply(&reply).map_err(|e| {
            error!("❌ Could not parse analysis reply: {}", e);
            AnalysisError::AnalysisFailed
        })?;

        let result = schema::validate_analysis_value(&value).map_err(|e| {
            error!("❌ Analysis reply failed schema validation: {}", e);
            AnalysisError::AnalysisFailed
        })?;

        info!("✅ Analysis completed ({} chars of input)", text.len());
        Ok(result)
    }

    /// Second template: regenerate the improvement tips from a precomputed
    /// analysis, as a numbered list validated against the one-field schema.
    pub async fn improvement_tips(
        &self,
        text: &str,
        analysis: &AnalysisResult,
    ) -> Result<ImprovementTips, AnalysisError> {
        schema::validate_request(text).map_err(|_| AnalysisError::InvalidInput)?;

        let prompt = prompts::improvement_tips_prompt(text, &render_analysis_summary(analysis));
        let reply = self
            .backend
            .complete(prompts::SYSTEM_PROMPT, &prompt, &self.model)
            .await
            .map_err(|e| {
                error!("❌ Tips model call failed: {:#}", e);
                AnalysisError::AnalysisFailed
            })?;

        let value = prompts::parse_tips_reply(&reply).map_err(|e| {
            error!("❌ Could not parse tips reply: {}", e);
            AnalysisError::AnalysisFailed
        })?;

        let tips = schema::validate_tips_value(&value).map_err(|e| {
            error!("❌ Tips reply failed schema validation: {}", e);
            AnalysisError::AnalysisFailed
        })?;

        info!("✅ Improvement tips generated");
        Ok(tips)
    }
}

/// Flatten a structured analysis into the plain-text form the tips
/// template expects.
fn render_analysis_summary(analysis: &AnalysisResult) -> String {
    format!(
        "Grammar: {} Style: {} Clarity: {} Overall: {}",
        analysis.grammar_feedback,
        analysis.style_feedback,
        analysis.clarity_feedback,
        analysis.overall_feedback
    )
}
