use crate::audit::AuditLog;
use crate::llm::prompts::{VALIDATE_SYSTEM, build_validate_prompt};
use crate::llm::Generate;
use crate::models::{StageName, StageResult};

use super::{invoke, StageConfig};

/// Default config for the validation stage
pub fn default_config() -> StageConfig {
    StageConfig {
        temperature: 0.0,
        max_tokens: 400,
    }
}

/// Stage 4: check the summary against its source, producing advisory notes.
///
/// Purely observational: the notes never veto or rewrite prior stage output.
pub async fn run_validate<G: Generate>(
    client: &G,
    config: &StageConfig,
    anonymized_text: &str,
    summary: &str,
    audit: &mut AuditLog,
) -> StageResult {
    let prompt = build_validate_prompt(anonymized_text, summary);
    invoke(client, StageName::Validate, config, VALIDATE_SYSTEM, &prompt, audit).await
}
