use tracing::info;

use crate::audit::AuditLog;
use crate::llm::Generate;
use crate::models::{ClinicalDocument, PipelineRecord, StageFailure, StageResult};
use crate::stages::{self, run_deidentify, run_extract, run_summarize, run_validate, StageConfig};

/// Per-stage decoding configuration for one pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    pub deidentify: StageConfig,
    pub extract: StageConfig,
    pub summarize: StageConfig,
    pub validate: StageConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            deidentify: stages::deidentify::default_config(),
            extract: stages::extract::default_config(),
            summarize: stages::summarize::default_config(),
            validate: stages::validate::default_config(),
        }
    }
}

/// Run the four-stage chain over one document and assemble its record.
///
/// Stages run strictly in order; each consumes the prior stage's output, so
/// there is no concurrency within a document. A stage failure is recorded in
/// `stage_failures` and an empty string flows forward; this function always
/// returns a record, never an error, which is what lets batch processing
/// proceed past individual document failures.
pub async fn process_document<G: Generate>(
    client: &G,
    config: &PipelineConfig,
    audit: &mut AuditLog,
    document: &ClinicalDocument,
) -> PipelineRecord {
    info!("Processing document {}", document.id);

    let mut failures = Vec::new();

    // Stage 1: de-identify (output already passed through the safety net)
    let deid = run_deidentify(client, &config.deidentify, &document.raw_text, audit).await;
    note_failure(&mut failures, &deid);
    let anonymized_text = deid.output;

    // Stage 2: extract structured facts
    let extract = run_extract(client, &config.extract, &anonymized_text, audit).await;
    note_failure(&mut failures, &extract);
    let extracted_facts = extract.output;

    // Stage 3: summarize
    let summarize =
        run_summarize(client, &config.summarize, &anonymized_text, &extracted_facts, audit).await;
    note_failure(&mut failures, &summarize);
    let summary = summarize.output;

    // Stage 4: validate
    let validate = run_validate(client, &config.validate, &anonymized_text, &summary, audit).await;
    note_failure(&mut failures, &validate);
    let quality_notes = validate.output;

    if !failures.is_empty() {
        info!(
            "Document {}: {} of 4 stages failed",
            document.id,
            failures.len()
        );
    }

    PipelineRecord {
        id: document.id.clone(),
        source: document.source.clone(),
        anonymized_text,
        extracted_facts,
        summary,
        quality_notes,
        stage_failures: failures,
    }
}

fn note_failure(failures: &mut Vec<StageFailure>, result: &StageResult) {
    if !result.succeeded {
        failures.push(StageFailure {
            stage: result.stage,
            reason: result.error.clone().unwrap_or_default(),
        });
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;
    use crate::llm::{Generate, GenerateError, GenerateRequest};
    use crate::models::StageName;

    /// Scripted generator: pops one pre-programmed outcome per call.
    /// An exhausted script fails the remaining calls.
    pub(crate) struct ScriptedClient {
        responses: Mutex<VecDeque<Result<String, String>>>,
    }

    impl ScriptedClient {
        pub(crate) fn new(responses: Vec<Result<String, String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
            }
        }

        /// A client whose every call fails with the same reason
        pub(crate) fn always_failing(reason: &str) -> Self {
            Self::new(vec![Err(reason.to_string()); 64])
        }
    }

    impl Generate for ScriptedClient {
        async fn generate(&self, _request: GenerateRequest<'_>) -> Result<String, GenerateError> {
            let next = self.responses.lock().unwrap().pop_front();
            match next {
                Some(Ok(text)) => Ok(text),
                Some(Err(body)) => Err(GenerateError::Api { status: 500, body }),
                None => Err(GenerateError::Empty),
            }
        }
    }

    fn sample_document() -> ClinicalDocument {
        ClinicalDocument::new(
            "doc-1",
            "test",
            "Patient: headache, 3 days. BP 140/90. Rx Sumatriptan 50mg.",
        )
    }

    #[tokio::test]
    async fn test_all_stages_fail_still_returns_record() {
        let client = ScriptedClient::always_failing("backend unavailable");
        let mut audit = AuditLog::disabled();

        let record = process_document(
            &client,
            &PipelineConfig::default(),
            &mut audit,
            &sample_document(),
        )
        .await;

        assert_eq!(record.stage_failures.len(), 4);
        let failed: Vec<StageName> = record.stage_failures.iter().map(|f| f.stage).collect();
        assert_eq!(
            failed,
            vec![
                StageName::Deidentify,
                StageName::Extract,
                StageName::Summarize,
                StageName::Validate
            ]
        );
        assert!(record.anonymized_text.is_empty());
        assert!(record.extracted_facts.is_empty());
        assert!(record.summary.is_empty());
        assert!(record.quality_notes.is_empty());
    }

    #[tokio::test]
    async fn test_safety_net_scrubs_residual_phone_number() {
        // The de-identification model "misses" a phone number; the safety net
        // must still strip it from the recorded anonymized text.
        let client = ScriptedClient::new(vec![
            Ok("Patient: headache, 3 days. Callback 555-123-4567. BP 140/90.".to_string()),
            Ok("Symptoms: headache, 3 days".to_string()),
            Ok("Patient presented with a 3-day headache.".to_string()),
            Ok("Summary is consistent with the source.".to_string()),
        ]);
        let mut audit = AuditLog::disabled();

        let record = process_document(
            &client,
            &PipelineConfig::default(),
            &mut audit,
            &sample_document(),
        )
        .await;

        assert!(record.stage_failures.is_empty());
        assert_eq!(
            record.anonymized_text,
            "Patient: headache, 3 days. Callback [CONTACT_INFO]. BP 140/90."
        );
        assert!(!record.anonymized_text.contains("555-123-4567"));
        assert_eq!(record.summary, "Patient presented with a 3-day headache.");
    }

    #[tokio::test]
    async fn test_single_stage_failure_preserves_partial_results() {
        // Extract fails; summarize and validate still run on the anonymized text.
        let client = ScriptedClient::new(vec![
            Ok("Anonymized conversation.".to_string()),
            Err("backend unavailable".to_string()),
            Ok("A summary.".to_string()),
            Ok("Notes.".to_string()),
        ]);
        let mut audit = AuditLog::disabled();

        let record = process_document(
            &client,
            &PipelineConfig::default(),
            &mut audit,
            &sample_document(),
        )
        .await;

        assert_eq!(record.stage_failures.len(), 1);
        assert_eq!(record.stage_failures[0].stage, StageName::Extract);
        assert!(record.extracted_facts.is_empty());
        assert_eq!(record.summary, "A summary.");
        assert_eq!(record.quality_notes, "Notes.");
    }
}
