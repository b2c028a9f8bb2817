// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns

pub mod aggregation;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod extractor;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod sources;
pub mod utils;

pub use aggregation::AggregationStore;
pub use config::{Config, CsvOptions, EnrichmentConfig, ExtractionConfig, InputConfig, OutputConfig};
pub use enrichment::{EnrichmentClient, IpInfoBackend, LookupBackend};
pub use error::{PipelineError, Result};
pub use extractor::{IndicatorExtractor, PatternRegistry};
pub use models::{
    AggregationEntry, EnrichmentResult, IndicatorKind, IndicatorMatch, IpDetails, ReportRecord,
};
pub use pipeline::{PipelineOrchestrator, PipelineOutcome, PipelineStats, ProgressTracker};
pub use report::{ReportAssembler, ReportWriter, reenrich_file};
pub use sources::{InputScanner, SourceFormat, SourceReader};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let config = Config::default_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.extraction.kinds().unwrap(), IndicatorKind::DEFAULT_PRIORITY);
    }
}
