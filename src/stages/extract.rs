use crate::audit::AuditLog;
use crate::llm::prompts::{EXTRACT_SYSTEM, build_extract_prompt};
use crate::llm::Generate;
use crate::models::{StageName, StageResult};

use super::{invoke, StageConfig};

/// Default config for the fact-extraction stage
pub fn default_config() -> StageConfig {
    StageConfig {
        temperature: 0.0,
        max_tokens: 800,
    }
}

/// Stage 2: extract structured clinical facts from the anonymized text.
pub async fn run_extract<G: Generate>(
    client: &G,
    config: &StageConfig,
    anonymized_text: &str,
    audit: &mut AuditLog,
) -> StageResult {
    let prompt = build_extract_prompt(anonymized_text);
    invoke(client, StageName::Extract, config, EXTRACT_SYSTEM, &prompt, audit).await
}
