use std::fmt;

use serde::{Deserialize, Serialize};

/// The four stages of the processing chain, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    Deidentify,
    Extract,
    Summarize,
    Validate,
}

impl StageName {
    /// Agent name used in audit log entries
    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::Deidentify => "deidentify",
            StageName::Extract => "extract",
            StageName::Summarize => "summarize",
            StageName::Validate => "validate",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single stage invocation.
///
/// Owned by the orchestrator for the duration of one document's processing.
/// A failed stage carries an empty `output` so the chain can continue with
/// best-effort input rather than aborting.
#[derive(Debug, Clone)]
pub struct StageResult {
    pub stage: StageName,
    pub output: String,
    pub succeeded: bool,
    pub error: Option<String>,
}

impl StageResult {
    pub fn success(stage: StageName, output: String) -> Self {
        Self {
            stage,
            output,
            succeeded: true,
            error: None,
        }
    }

    pub fn failure(stage: StageName, reason: String) -> Self {
        Self {
            stage,
            output: String::new(),
            succeeded: false,
            error: Some(reason),
        }
    }
}

/// A stage that failed during one document's processing.
///
/// The reason text is retained so the batch executor can classify
/// rate-limit signals after the fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageFailure {
    pub stage: StageName,
    pub reason: String,
}

/// Aggregate of all four stage results for one document.
///
/// Immutable once the orchestrator returns it. Fields for failed stages
/// are empty strings, never absent, so downstream consumers branch on
/// emptiness rather than key presence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRecord {
    pub id: String,
    pub source: String,
    /// De-identification output after the unconditional redaction pass
    pub anonymized_text: String,
    /// Structured clinical facts (symptoms, vitals, medications, follow-up)
    pub extracted_facts: String,
    /// Concise clinical summary
    pub summary: String,
    /// Advisory quality/consistency notes from the validation stage
    pub quality_notes: String,
    /// Stages that failed, in execution order
    pub stage_failures: Vec<StageFailure>,
}

impl PipelineRecord {
    /// True when every stage produced output
    pub fn is_complete(&self) -> bool {
        self.stage_failures.is_empty()
    }

    /// True when any stage failure looks like a rate-limit signal
    pub fn has_throttle_failure(&self) -> bool {
        self.stage_failures
            .iter()
            .any(|f| crate::llm::is_throttle_message(&f.reason))
    }
}
