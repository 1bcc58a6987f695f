pub mod document;
pub mod record;
pub mod report;

pub use document::ClinicalDocument;
pub use record::{PipelineRecord, StageFailure, StageName, StageResult};
pub use report::{BatchReport, QualityScore};
