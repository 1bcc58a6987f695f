use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::models::{BatchReport, PipelineRecord, QualityScore};

/// Persisted batch artifact: aggregate metrics plus every per-record output,
/// written once at the end of a run.
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchArtifact {
    pub metrics: BatchMetrics,
    pub results: Vec<PipelineRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchMetrics {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub total_records: usize,
    pub successful_records: usize,
    pub throttle_events: usize,
    pub average_rouge_scores: Option<QualityScore>,
}

impl BatchArtifact {
    pub fn from_report(report: BatchReport) -> Self {
        Self {
            metrics: BatchMetrics {
                run_id: Uuid::new_v4(),
                generated_at: Utc::now(),
                total_records: report.total,
                successful_records: report.succeeded_count,
                throttle_events: report.throttle_events,
                average_rouge_scores: report.aggregate_scores,
            },
            results: report.records,
        }
    }
}

/// Serialize a value as pretty JSON and commit it atomically.
///
/// The payload is written to a temporary file in the destination directory
/// and renamed into place, so a failed run never leaves a half-written
/// artifact behind. Write failures are fatal to the run.
pub fn write_json_atomic<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)
        .with_context(|| format!("Failed to create output directory: {parent:?}"))?;

    let tmp = NamedTempFile::new_in(&parent)
        .with_context(|| format!("Failed to create temporary file in {parent:?}"))?;
    serde_json::to_writer_pretty(&tmp, value).context("Failed to serialize artifact")?;
    tmp.persist(path)
        .with_context(|| format!("Failed to commit artifact to {path:?}"))?;
    Ok(())
}

/// Load a previously persisted batch artifact
pub fn read_batch_artifact(path: &Path) -> Result<BatchArtifact> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch artifact: {path:?}"))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse batch artifact: {path:?}"))
}
