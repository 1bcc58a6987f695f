use serde::{Deserialize, Serialize};

use super::PipelineRecord;

/// ROUGE F-measures for one reference/candidate pair, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityScore {
    pub rouge1: f64,
    pub rouge2: f64,
    #[serde(rename = "rougeL")]
    pub rouge_l: f64,
}

impl QualityScore {
    pub fn zero() -> Self {
        Self {
            rouge1: 0.0,
            rouge2: 0.0,
            rouge_l: 0.0,
        }
    }
}

/// Terminal artifact of one batch run.
#[derive(Debug)]
pub struct BatchReport {
    /// Per-document records, in input order
    pub records: Vec<PipelineRecord>,
    /// Mean quality over records that could be scored, if any
    pub aggregate_scores: Option<QualityScore>,
    pub total: usize,
    /// Records with no stage failures
    pub succeeded_count: usize,
    /// Extended cooldowns taken during the run
    pub throttle_events: usize,
}
