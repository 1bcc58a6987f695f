use crate::audit::AuditLog;
use crate::llm::prompts::{SUMMARIZE_SYSTEM, build_summarize_prompt};
use crate::llm::Generate;
use crate::models::{StageName, StageResult};

use super::{invoke, StageConfig};

/// Default config for the summarization stage
pub fn default_config() -> StageConfig {
    StageConfig {
        temperature: 0.0,
        max_tokens: 400,
    }
}

/// Stage 3: write a concise clinical summary of the anonymized text.
///
/// Extracted facts from stage 2 are passed along as supporting context;
/// an empty facts string (e.g., after an extract failure) is simply omitted
/// from the prompt.
pub async fn run_summarize<G: Generate>(
    client: &G,
    config: &StageConfig,
    anonymized_text: &str,
    extracted_facts: &str,
    audit: &mut AuditLog,
) -> StageResult {
    let prompt = build_summarize_prompt(anonymized_text, extracted_facts);
    invoke(client, StageName::Summarize, config, SUMMARIZE_SYSTEM, &prompt, audit).await
}
