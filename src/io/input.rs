use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::ClinicalDocument;

/// One row from the data source.
///
/// Only `text` is required; absent ids fall back to the row's ordinal
/// position and absent sources to "unknown".
#[derive(Debug, Deserialize)]
struct SourceRow {
    text: String,
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    source: Option<String>,
}

impl SourceRow {
    fn into_document(self, ordinal: usize) -> ClinicalDocument {
        let id = match self.id {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => ordinal.to_string(),
        };
        let source = self.source.unwrap_or_else(|| "unknown".to_string());
        ClinicalDocument::new(id, source, self.text)
    }
}

/// Load input documents from a rows file (JSON array or JSONL)
pub fn load_documents(path: &Path) -> Result<Vec<ClinicalDocument>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read rows file: {path:?}"))?;
    parse_documents(&content).with_context(|| format!("Failed to parse rows file: {path:?}"))
}

/// Parse rows from a JSON array, or one JSON object per line
pub fn parse_documents(content: &str) -> Result<Vec<ClinicalDocument>> {
    let trimmed = content.trim_start();

    let rows: Vec<SourceRow> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).context("Failed to parse rows as JSON array")?
    } else {
        trimmed
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
            .map(|(i, line)| {
                serde_json::from_str(line).with_context(|| format!("Invalid row on line {}", i + 1))
            })
            .collect::<Result<Vec<SourceRow>>>()?
    };

    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| row.into_document(i))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_array() {
        let content = r#"[
            {"id": 7, "source": "meddialog", "text": "Patient: hello"},
            {"text": "Doctor: hello"}
        ]"#;

        let docs = parse_documents(content).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "7");
        assert_eq!(docs[0].source, "meddialog");
        assert_eq!(docs[1].id, "1");
        assert_eq!(docs[1].source, "unknown");
    }

    #[test]
    fn test_parse_jsonl_with_blank_lines() {
        let content = "{\"text\": \"row one\"}\n\n{\"id\": \"abc\", \"text\": \"row two\"}\n";

        let docs = parse_documents(content).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "0");
        assert_eq!(docs[0].raw_text, "row one");
        assert_eq!(docs[1].id, "abc");
    }

    #[test]
    fn test_row_without_text_is_an_error() {
        assert!(parse_documents(r#"[{"id": 1}]"#).is_err());
    }
}
