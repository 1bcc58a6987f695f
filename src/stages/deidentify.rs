use crate::audit::AuditLog;
use crate::llm::prompts::{DEIDENTIFY_SYSTEM, build_deidentify_prompt};
use crate::llm::Generate;
use crate::models::{StageName, StageResult};
use crate::redaction::scrub;

use super::{invoke, StageConfig};

/// Default config for the de-identification stage
pub fn default_config() -> StageConfig {
    StageConfig {
        temperature: 0.0,
        max_tokens: 1200,
    }
}

/// Stage 1: remove patient-identifying details from the raw transcript.
///
/// The model output is passed through the redaction safety net
/// unconditionally, even when the call succeeded. The scrubbed text is
/// what the rest of the chain sees.
pub async fn run_deidentify<G: Generate>(
    client: &G,
    config: &StageConfig,
    raw_text: &str,
    audit: &mut AuditLog,
) -> StageResult {
    let prompt = build_deidentify_prompt(raw_text);
    let mut result = invoke(client, StageName::Deidentify, config, DEIDENTIFY_SYSTEM, &prompt, audit).await;
    result.output = scrub(&result.output);
    result
}
