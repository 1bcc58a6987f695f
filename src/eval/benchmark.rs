use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{PipelineRecord, QualityScore};

use super::rouge::{mean, score};

/// Sentences kept by the extractive baseline
const EXTRACTIVE_SENTENCES: usize = 3;

/// Fixed sentence used by the template baseline
pub const TEMPLATE_SUMMARY: &str = "Patient presented with medical concerns. \
Conversation documented. Further review recommended.";

/// Aggregate comparison of the pipeline against the two reference baselines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub our_pipeline: QualityScore,
    pub baseline_extractive: QualityScore,
    pub baseline_template: QualityScore,
    pub num_samples: usize,
    /// Relative rouge1 improvement over the extractive baseline, percent.
    /// Absent when the baseline scored zero.
    pub improvement_vs_extractive_pct: Option<f64>,
    /// Relative rouge1 improvement over the template baseline, percent
    pub improvement_vs_template_pct: Option<f64>,
}

/// Baseline 1: keep the leading sentences of the source text
pub fn extractive_baseline(text: &str, max_sentences: usize) -> String {
    let sentences: Vec<&str> = text.split('.').collect();
    let mut summary = sentences
        .iter()
        .take(max_sentences)
        .copied()
        .collect::<Vec<_>>()
        .join(".");
    summary.push('.');
    summary
}

/// Percentage relative improvement of `ours` over `baseline`.
///
/// Guarded: a zero baseline yields None rather than a division by zero.
pub fn relative_improvement_pct(ours: f64, baseline: f64) -> Option<f64> {
    (baseline > 0.0).then(|| (ours - baseline) / baseline * 100.0)
}

/// Score the pipeline's summaries and both baselines over the same
/// candidate/reference pairs.
///
/// Records missing either the anonymized text or the summary are skipped
/// for all three approaches, keeping the comparison paired.
pub fn run_benchmark(records: &[PipelineRecord]) -> BenchmarkReport {
    let mut ours = Vec::new();
    let mut extractive = Vec::new();
    let mut template = Vec::new();

    for record in records {
        let source = &record.anonymized_text;
        let summary = &record.summary;
        if source.is_empty() || summary.is_empty() {
            continue;
        }

        ours.push(score(source, summary));
        extractive.push(score(source, &extractive_baseline(source, EXTRACTIVE_SENTENCES)));
        template.push(score(source, TEMPLATE_SUMMARY));
    }

    let num_samples = ours.len();
    let our_pipeline = mean(&ours).unwrap_or_else(QualityScore::zero);
    let baseline_extractive = mean(&extractive).unwrap_or_else(QualityScore::zero);
    let baseline_template = mean(&template).unwrap_or_else(QualityScore::zero);

    let report = BenchmarkReport {
        improvement_vs_extractive_pct: relative_improvement_pct(
            our_pipeline.rouge1,
            baseline_extractive.rouge1,
        ),
        improvement_vs_template_pct: relative_improvement_pct(
            our_pipeline.rouge1,
            baseline_template.rouge1,
        ),
        our_pipeline,
        baseline_extractive,
        baseline_template,
        num_samples,
    };

    info!(
        "Benchmark over {} samples: pipeline rouge1 {:.3}, extractive {:.3}, template {:.3}",
        report.num_samples,
        report.our_pipeline.rouge1,
        report.baseline_extractive.rouge1,
        report.baseline_template.rouge1
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extractive_baseline_keeps_leading_sentences() {
        let text = "First sentence. Second sentence. Third sentence. Fourth sentence.";
        let summary = extractive_baseline(text, 3);
        assert_eq!(summary, "First sentence. Second sentence. Third sentence.");
    }

    #[test]
    fn test_extractive_baseline_short_text_unchanged() {
        let summary = extractive_baseline("Only one sentence", 3);
        assert_eq!(summary, "Only one sentence.");
    }

    #[test]
    fn test_relative_improvement_doubling_is_plus_100() {
        let improvement = relative_improvement_pct(0.40, 0.20).unwrap();
        assert!((improvement - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_relative_improvement_guards_zero_baseline() {
        assert!(relative_improvement_pct(0.40, 0.0).is_none());
    }

    #[test]
    fn test_relative_improvement_can_be_negative() {
        let improvement = relative_improvement_pct(0.10, 0.20).unwrap();
        assert!((improvement + 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_run_benchmark_skips_unscorable_records() {
        let scorable = PipelineRecord {
            id: "1".to_string(),
            source: "test".to_string(),
            anonymized_text: "patient has a headache. follow up in two weeks.".to_string(),
            extracted_facts: String::new(),
            summary: "patient has a headache".to_string(),
            quality_notes: String::new(),
            stage_failures: vec![],
        };
        let mut unscorable = scorable.clone();
        unscorable.id = "2".to_string();
        unscorable.summary = String::new();

        let report = run_benchmark(&[scorable, unscorable]);
        assert_eq!(report.num_samples, 1);
        assert!(report.our_pipeline.rouge1 > 0.0);
    }
}
