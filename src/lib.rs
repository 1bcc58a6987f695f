pub mod audit;
pub mod batch;
pub mod eval;
pub mod io;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod redaction;
pub mod stages;

pub use audit::AuditLog;
pub use batch::{BatchConfig, BatchExecutor, CancelFlag, RateLimitState};
pub use eval::{aggregate, run_benchmark, score, BenchmarkReport};
pub use io::{load_documents, read_batch_artifact, write_json_atomic, BatchArtifact};
pub use llm::{Generate, GeminiClient, GeminiConfig};
pub use models::{BatchReport, ClinicalDocument, PipelineRecord, QualityScore, StageName};
pub use pipeline::{process_document, PipelineConfig};
pub use redaction::scrub;
