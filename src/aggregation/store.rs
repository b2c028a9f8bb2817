// file: src/aggregation/store.rs
// description: deduplicating indicator store with occurrence counts and provenance
// reference: internal data structures

use crate::models::{AggregationEntry, IndicatorKind, IndicatorMatch};
use std::collections::HashMap;
use tracing::debug;

/// Entries keyed by indicator value, iterated in first-seen order.
#[derive(Debug, Default)]
pub struct AggregationStore {
    entries: Vec<AggregationEntry>,
    index: HashMap<String, usize>,
}

impl AggregationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one sighting. The kind of an existing entry is never changed.
    pub fn record(&mut self, value: &str, kind: IndicatorKind, source_id: &str) {
        if let Some(&position) = self.index.get(value) {
            let entry = &mut self.entries[position];
            if entry.kind != kind {
                debug!(
                    "'{}' matched as {} but is already recorded as {}",
                    value, kind, entry.kind
                );
            }
            entry.observe(source_id);
            return;
        }

        self.index.insert(value.to_string(), self.entries.len());
        self.entries
            .push(AggregationEntry::new(value.to_string(), kind, source_id));
    }

    pub fn record_match(&mut self, found: &IndicatorMatch, source_id: &str) {
        self.record(&found.value, found.kind, source_id);
    }

    pub fn get(&self, value: &str) -> Option<&AggregationEntry> {
        self.index.get(value).map(|&position| &self.entries[position])
    }

    pub fn entries(&self) -> impl Iterator<Item = &AggregationEntry> {
        self.entries.iter()
    }

    pub fn entries_of(&self, kind: IndicatorKind) -> impl Iterator<Item = &AggregationEntry> {
        self.entries.iter().filter(move |entry| entry.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_occurrences(&self) -> u64 {
        self.entries.iter().map(|entry| entry.count).sum()
    }
}
