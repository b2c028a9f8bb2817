// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

mod orchestrator;
mod progress;

pub use orchestrator::{ExtractionSummary, PipelineOrchestrator, PipelineOutcome, extract_sources};
pub use progress::{PipelineStats, ProgressTracker};
