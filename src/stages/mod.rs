pub mod deidentify;
pub mod extract;
pub mod summarize;
pub mod validate;

pub use deidentify::run_deidentify;
pub use extract::run_extract;
pub use summarize::run_summarize;
pub use validate::run_validate;

use tracing::warn;

use crate::audit::AuditLog;
use crate::llm::{Generate, GenerateRequest};
use crate::models::{StageName, StageResult};

/// Decoding configuration for one stage.
///
/// Fixed per stage: temperature 0 for deterministic-leaning output, with a
/// bounded token ceiling. Never negotiated at runtime.
#[derive(Debug, Clone, Copy)]
pub struct StageConfig {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: 800,
        }
    }
}

/// Run one generative call for a stage and convert the outcome to a StageResult.
///
/// Every invocation, success or failure, produces exactly one audit entry.
/// A failed call records the reason and yields an empty output so the chain
/// continues with best-effort input; the chain never halts early.
pub(crate) async fn invoke<G: Generate>(
    client: &G,
    stage: StageName,
    config: &StageConfig,
    system: &str,
    prompt: &str,
    audit: &mut AuditLog,
) -> StageResult {
    let request = GenerateRequest {
        system,
        prompt,
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    };

    match client.generate(request).await {
        Ok(output) => {
            audit.record(stage, prompt, &output);
            StageResult::success(stage, output)
        }
        Err(e) => {
            let reason = e.to_string();
            warn!("Stage {stage} failed: {reason}");
            audit.record(stage, prompt, "");
            StageResult::failure(stage, reason)
        }
    }
}
