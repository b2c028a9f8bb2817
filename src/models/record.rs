// file: src/models/record.rs
// description: one output row of the indicator report
// reference: internal data structures

use crate::models::{AggregationEntry, EnrichmentResult, IndicatorKind};
use serde::Serialize;

pub const REPORT_HEADER: [&str; 9] = [
    "Regex result",
    "Count",
    "Type",
    "Found in file(s)",
    "City",
    "Country",
    "Organization",
    "Full",
    "Error",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRecord {
    pub value: String,
    pub count: u64,
    pub kind: IndicatorKind,
    pub sources: String,
    pub city: String,
    pub country: String,
    pub organization: String,
    pub full: String,
    pub error: String,
}

impl ReportRecord {
    pub fn from_entry(entry: &AggregationEntry) -> Self {
        Self {
            value: entry.value.clone(),
            count: entry.count,
            kind: entry.kind,
            sources: entry.sources_joined(),
            city: String::new(),
            country: String::new(),
            organization: String::new(),
            full: String::new(),
            error: String::new(),
        }
    }

    pub fn with_enrichment(mut self, enrichment: &EnrichmentResult) -> Self {
        self.city = enrichment.city.clone();
        self.country = enrichment.country.clone();
        self.organization = enrichment.organization.clone();
        self.full = enrichment.attributes_json();
        self.error = enrichment.error.clone();
        self
    }

    pub fn to_row(&self) -> [String; 9] {
        [
            self.value.clone(),
            self.count.to_string(),
            self.kind.to_string(),
            self.sources.clone(),
            self.city.clone(),
            self.country.clone(),
            self.organization.clone(),
            self.full.clone(),
            self.error.clone(),
        ]
    }
}
