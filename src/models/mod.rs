// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod enrichment;
pub mod indicator;
pub mod record;

pub use enrichment::{EnrichmentResult, IpDetails};
pub use indicator::{AggregationEntry, IndicatorKind, IndicatorMatch};
pub use record::{REPORT_HEADER, ReportRecord};
