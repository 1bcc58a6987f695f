pub mod input;
pub mod output;

pub use input::{load_documents, parse_documents};
pub use output::{read_batch_artifact, write_json_atomic, BatchArtifact, BatchMetrics};
