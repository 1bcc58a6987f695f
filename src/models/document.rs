use serde::{Deserialize, Serialize};

/// One input unit for the pipeline: a raw clinical conversation transcript.
///
/// Immutable once constructed; consumed exactly once per batch item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicalDocument {
    /// Stable identifier for correlating output records with source rows
    pub id: String,
    /// Dataset or origin tag (e.g., "ruslanmv_ai_medical_chatbot")
    pub source: String,
    /// The raw transcript text, possibly containing identifiers
    pub raw_text: String,
}

impl ClinicalDocument {
    pub fn new(id: impl Into<String>, source: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            raw_text: raw_text.into(),
        }
    }
}
