use std::collections::HashMap;

use crate::models::{PipelineRecord, QualityScore};

/// Lowercased alphanumeric tokens; punctuation is a separator
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
        .collect()
}

/// F-measure from an overlap count and the two lengths; 0 when either is empty
fn f_measure(overlap: usize, reference_len: usize, candidate_len: usize) -> f64 {
    if reference_len == 0 || candidate_len == 0 || overlap == 0 {
        return 0.0;
    }
    let precision = overlap as f64 / candidate_len as f64;
    let recall = overlap as f64 / reference_len as f64;
    2.0 * precision * recall / (precision + recall)
}

/// Clipped n-gram overlap between two token sequences
fn ngram_overlap(reference: &[String], candidate: &[String], n: usize) -> (usize, usize, usize) {
    let ref_count = reference.len().saturating_sub(n - 1);
    let cand_count = candidate.len().saturating_sub(n - 1);
    if ref_count == 0 || cand_count == 0 {
        return (0, ref_count, cand_count);
    }

    let mut ref_grams: HashMap<&[String], usize> = HashMap::new();
    for gram in reference.windows(n) {
        *ref_grams.entry(gram).or_insert(0) += 1;
    }

    let mut overlap = 0;
    for gram in candidate.windows(n) {
        if let Some(remaining) = ref_grams.get_mut(gram) {
            if *remaining > 0 {
                *remaining -= 1;
                overlap += 1;
            }
        }
    }

    (overlap, ref_count, cand_count)
}

/// Longest common subsequence length at token granularity
fn lcs_len(a: &[String], b: &[String]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    // Single-row DP over the shorter dimension
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let mut row = vec![0usize; short.len() + 1];
    for item in long {
        let mut prev_diag = 0;
        for (j, s) in short.iter().enumerate() {
            let tmp = row[j + 1];
            row[j + 1] = if item == s {
                prev_diag + 1
            } else {
                row[j + 1].max(row[j])
            };
            prev_diag = tmp;
        }
    }
    row[short.len()]
}

/// ROUGE-1, ROUGE-2, and ROUGE-L F-measures between a reference and a
/// candidate text.
///
/// Either text empty (or with no tokens) yields all zeros rather than an
/// error; a record that produced nothing simply scores nothing.
pub fn score(reference_text: &str, candidate_text: &str) -> QualityScore {
    let reference = tokenize(reference_text);
    let candidate = tokenize(candidate_text);

    if reference.is_empty() || candidate.is_empty() {
        return QualityScore::zero();
    }

    let (overlap1, ref1, cand1) = ngram_overlap(&reference, &candidate, 1);
    let (overlap2, ref2, cand2) = ngram_overlap(&reference, &candidate, 2);
    let lcs = lcs_len(&reference, &candidate);

    QualityScore {
        rouge1: f_measure(overlap1, ref1, cand1),
        rouge2: f_measure(overlap2, ref2, cand2),
        rouge_l: f_measure(lcs, reference.len(), candidate.len()),
    }
}

/// Arithmetic mean of per-record scores over records that can be scored.
///
/// A record missing either the anonymized text or the summary is excluded
/// from the denominator, not averaged in as zero. Returns None when no
/// record qualifies.
pub fn aggregate(records: &[PipelineRecord]) -> Option<QualityScore> {
    let scores: Vec<QualityScore> = records
        .iter()
        .filter(|r| !r.anonymized_text.is_empty() && !r.summary.is_empty())
        .map(|r| score(&r.anonymized_text, &r.summary))
        .collect();

    mean(&scores)
}

/// Mean of a score list; None when empty
pub fn mean(scores: &[QualityScore]) -> Option<QualityScore> {
    if scores.is_empty() {
        return None;
    }
    let n = scores.len() as f64;
    Some(QualityScore {
        rouge1: scores.iter().map(|s| s.rouge1).sum::<f64>() / n,
        rouge2: scores.iter().map(|s| s.rouge2).sum::<f64>() / n,
        rouge_l: scores.iter().map(|s| s.rouge_l).sum::<f64>() / n,
    })
}
