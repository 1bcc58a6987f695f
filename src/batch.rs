use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};

use crate::audit::AuditLog;
use crate::eval;
use crate::llm::Generate;
use crate::models::{BatchReport, ClinicalDocument};
use crate::pipeline::{process_document, PipelineConfig};

/// Pacing configuration for one batch run.
///
/// Each document costs 4 generative calls; the steady-state delay is sized
/// to keep that under the provider's request-per-minute ceiling (30 RPM on
/// the free tier). Both delays are configuration constants, not derived
/// from the observed rate.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum number of documents to process
    pub limit: usize,
    /// Fixed delay between consecutive documents
    pub request_delay: Duration,
    /// Extended cooldown after a rate-limit signal
    pub throttle_cooldown: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            limit: 10,
            request_delay: Duration::from_secs(10),
            throttle_cooldown: Duration::from_secs(60),
        }
    }
}

/// Rate-limit bookkeeping, owned exclusively by the executor.
///
/// Mutated only between documents; no stage ever reads it, so no locking
/// is needed.
#[derive(Debug, Default)]
pub struct RateLimitState {
    /// Generative calls attempted so far (4 per document)
    pub calls_made: usize,
    /// End of the current cooldown, while one is in effect
    pub cooldown_until: Option<Instant>,
    /// Extended cooldowns taken so far
    pub throttle_events: usize,
}

/// Cooperative stop signal, checked only at the top of the running loop.
///
/// The unit of cancellation is "stop enqueuing further documents"; nothing
/// mid-flight is interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Executor states; THROTTLED is entered when a document's record carries a
/// rate-limit failure, and lasts for exactly one extended cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchState {
    Running,
    Throttled,
    Done,
}

/// Drives the pipeline across many documents, strictly sequentially and in
/// input order, under the external request-rate ceiling.
pub struct BatchExecutor {
    config: BatchConfig,
    state: RateLimitState,
    cancel: CancelFlag,
}

impl BatchExecutor {
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            state: RateLimitState::default(),
            cancel: CancelFlag::new(),
        }
    }

    /// Handle for requesting a stop from outside the run
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Process at most `limit` documents and assemble the batch report.
    ///
    /// Documents are processed in input order with a fixed sleep between
    /// consecutive documents. A record carrying a rate-limit failure moves
    /// the executor to THROTTLED for a single extended cooldown; the
    /// partial record is kept, not retried, and processing resumes with the
    /// next document. Non-throttle failures are already absorbed into the
    /// record by the orchestrator and cost no cooldown.
    pub async fn run<G: Generate>(
        &mut self,
        client: &G,
        pipeline_config: &PipelineConfig,
        audit: &mut AuditLog,
        documents: Vec<ClinicalDocument>,
    ) -> BatchReport {
        let total_planned = documents.len().min(self.config.limit);
        info!("Starting batch run over {total_planned} documents");

        let mut records = Vec::with_capacity(total_planned);
        let mut state = BatchState::Running;
        let mut queue = documents.into_iter().take(self.config.limit).peekable();

        while state != BatchState::Done {
            match state {
                BatchState::Running => {
                    if self.cancel.is_cancelled() {
                        info!("Batch run cancelled; stopping before next document");
                        state = BatchState::Done;
                        continue;
                    }
                    let Some(document) = queue.next() else {
                        state = BatchState::Done;
                        continue;
                    };

                    let record =
                        process_document(client, pipeline_config, audit, &document).await;
                    self.state.calls_made += 4;
                    let throttled = record.has_throttle_failure();
                    records.push(record);

                    if throttled {
                        state = BatchState::Throttled;
                    } else if queue.peek().is_some() {
                        tokio::time::sleep(self.config.request_delay).await;
                    }
                }
                BatchState::Throttled => {
                    warn!(
                        "Rate limit hit; cooling down for {:?}",
                        self.config.throttle_cooldown
                    );
                    self.state.throttle_events += 1;
                    let until = Instant::now() + self.config.throttle_cooldown;
                    self.state.cooldown_until = Some(until);
                    tokio::time::sleep_until(until).await;
                    self.state.cooldown_until = None;
                    state = BatchState::Running;
                }
                BatchState::Done => unreachable!(),
            }
        }

        let aggregate_scores = eval::aggregate(&records);
        let total = records.len();
        let succeeded_count = records.iter().filter(|r| r.is_complete()).count();

        info!(
            "Batch run finished: {total} records, {succeeded_count} complete, {} throttle cooldowns",
            self.state.throttle_events
        );

        BatchReport {
            records,
            aggregate_scores,
            total,
            succeeded_count,
            throttle_events: self.state.throttle_events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tests::ScriptedClient;

    fn documents(n: usize) -> Vec<ClinicalDocument> {
        (1..=n)
            .map(|i| ClinicalDocument::new(format!("doc-{i}"), "test", format!("transcript {i}")))
            .collect()
    }

    fn fast_config(limit: usize) -> BatchConfig {
        BatchConfig {
            limit,
            request_delay: Duration::ZERO,
            throttle_cooldown: Duration::ZERO,
        }
    }

    fn ok_document_script() -> Vec<Result<String, String>> {
        vec![
            Ok("anonymized".to_string()),
            Ok("facts".to_string()),
            Ok("summary".to_string()),
            Ok("notes".to_string()),
        ]
    }

    #[tokio::test]
    async fn test_processes_documents_in_order_up_to_limit() {
        let mut script = Vec::new();
        for _ in 0..3 {
            script.extend(ok_document_script());
        }
        let client = ScriptedClient::new(script);
        let mut audit = AuditLog::disabled();

        let mut executor = BatchExecutor::new(fast_config(3));
        let report = executor
            .run(&client, &PipelineConfig::default(), &mut audit, documents(5))
            .await;

        assert_eq!(report.total, 3);
        assert_eq!(report.succeeded_count, 3);
        assert_eq!(report.throttle_events, 0);
        let ids: Vec<&str> = report.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["doc-1", "doc-2", "doc-3"]);
    }

    #[tokio::test]
    async fn test_throttle_mid_batch_cools_down_once_and_resumes() {
        // Documents 1-2 succeed; document 3 hits the quota on its first call
        // (remaining stage calls fail too); documents 4-5 succeed.
        let mut script = Vec::new();
        script.extend(ok_document_script());
        script.extend(ok_document_script());
        script.extend(vec![Err("429 Quota exceeded".to_string()); 4]);
        script.extend(ok_document_script());
        script.extend(ok_document_script());
        let client = ScriptedClient::new(script);
        let mut audit = AuditLog::disabled();

        let mut executor = BatchExecutor::new(fast_config(5));
        let report = executor
            .run(&client, &PipelineConfig::default(), &mut audit, documents(5))
            .await;

        // Exactly one extended cooldown, and doc-3's partial record is kept
        // exactly once; processing resumed at doc-4.
        assert_eq!(report.throttle_events, 1);
        assert_eq!(report.total, 5);
        let ids: Vec<&str> = report.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["doc-1", "doc-2", "doc-3", "doc-4", "doc-5"]);
        assert_eq!(report.records[2].stage_failures.len(), 4);
        assert_eq!(report.succeeded_count, 4);
    }

    #[tokio::test]
    async fn test_non_throttle_failure_continues_without_cooldown() {
        let mut script = Vec::new();
        script.extend(vec![Err("backend unavailable".to_string()); 4]);
        script.extend(ok_document_script());
        let client = ScriptedClient::new(script);
        let mut audit = AuditLog::disabled();

        let mut executor = BatchExecutor::new(fast_config(2));
        let report = executor
            .run(&client, &PipelineConfig::default(), &mut audit, documents(2))
            .await;

        assert_eq!(report.throttle_events, 0);
        assert_eq!(report.total, 2);
        assert_eq!(report.succeeded_count, 1);
        assert_eq!(report.records[0].stage_failures.len(), 4);
        assert!(report.records[1].is_complete());
    }

    #[tokio::test]
    async fn test_cancel_stops_before_next_document() {
        let client = ScriptedClient::new(ok_document_script());
        let mut audit = AuditLog::disabled();

        let mut executor = BatchExecutor::new(fast_config(5));
        executor.cancel_flag().cancel();
        let report = executor
            .run(&client, &PipelineConfig::default(), &mut audit, documents(5))
            .await;

        assert_eq!(report.total, 0);
        assert!(report.records.is_empty());
    }

    #[tokio::test]
    async fn test_aggregate_scores_present_for_scorable_records() {
        let script = vec![
            Ok("patient reports headache for three days".to_string()),
            Ok("facts".to_string()),
            Ok("patient reports headache for three days".to_string()),
            Ok("notes".to_string()),
        ];
        let client = ScriptedClient::new(script);
        let mut audit = AuditLog::disabled();

        let mut executor = BatchExecutor::new(fast_config(1));
        let report = executor
            .run(&client, &PipelineConfig::default(), &mut audit, documents(1))
            .await;

        let scores = report.aggregate_scores.unwrap();
        assert_eq!(scores.rouge1, 1.0);
    }
}
