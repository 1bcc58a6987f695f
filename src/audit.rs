use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::models::StageName;

/// How much of the stage input is kept in an audit entry
const PREVIEW_CHARS: usize = 500;

/// One audit entry per stage invocation, appended as a JSON line.
#[derive(Debug, Serialize)]
struct AuditEntry<'a> {
    timestamp: DateTime<Utc>,
    agent: &'static str,
    input_preview: String,
    output: &'a str,
}

/// Append-only record of every generative call the pipeline makes.
///
/// Constructed once per run and passed down explicitly; there is no global
/// logger state. Each entry carries the agent name, a truncated input
/// preview, and the full output. Sink write failures are logged and
/// swallowed so an audit problem never fails a stage.
pub struct AuditLog {
    sink: Option<BufWriter<std::fs::File>>,
}

impl AuditLog {
    /// Audit log backed by an append-only JSONL file
    pub fn to_file(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create audit log directory: {parent:?}"))?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open audit log: {path:?}"))?;
        Ok(Self {
            sink: Some(BufWriter::new(file)),
        })
    }

    /// Audit log that only emits tracing events (used in tests)
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    /// Record one stage invocation
    pub fn record(&mut self, agent: StageName, input: &str, output: &str) {
        let entry = AuditEntry {
            timestamp: Utc::now(),
            agent: agent.as_str(),
            input_preview: truncate_preview(input, PREVIEW_CHARS),
            output,
        };

        info!(
            agent = entry.agent,
            input_chars = input.chars().count(),
            output_chars = output.chars().count(),
            "stage invocation"
        );

        if let Some(sink) = &mut self.sink {
            let write = serde_json::to_string(&entry)
                .map_err(std::io::Error::other)
                .and_then(|line| writeln!(sink, "{line}").and_then(|_| sink.flush()));
            if let Err(e) = write {
                warn!("Failed to append audit entry: {e}");
            }
        }
    }
}

/// Truncate to at most `max` characters, marking elision
fn truncate_preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut preview: String = text.chars().take(max).collect();
    preview.push_str("...");
    preview
}
