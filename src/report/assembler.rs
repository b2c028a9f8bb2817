// file: src/report/assembler.rs
// description: joins aggregated indicators with ip enrichment into report records
// reference: internal data structures

use crate::aggregation::AggregationStore;
use crate::enrichment::EnrichmentClient;
use crate::models::{EnrichmentResult, IndicatorKind, ReportRecord};
use crate::pipeline::ProgressTracker;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use tracing::info;

pub struct ReportAssembler {
    workers: usize,
}

impl ReportAssembler {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// One record per store entry, in store order. IP entries are enriched when a client is given.
    pub async fn assemble(
        &self,
        store: &AggregationStore,
        client: Option<&EnrichmentClient>,
        progress: Option<&ProgressTracker>,
    ) -> Vec<ReportRecord> {
        let enrichments = match client {
            Some(client) => self.enrich_ips(store, client, progress).await,
            None => HashMap::new(),
        };

        store
            .entries()
            .map(|entry| {
                let record = ReportRecord::from_entry(entry);
                match enrichments.get(&entry.value) {
                    Some(enrichment) if entry.kind == IndicatorKind::IpAddress => {
                        record.with_enrichment(enrichment)
                    }
                    _ => record,
                }
            })
            .collect()
    }

    async fn enrich_ips(
        &self,
        store: &AggregationStore,
        client: &EnrichmentClient,
        progress: Option<&ProgressTracker>,
    ) -> HashMap<String, EnrichmentResult> {
        let ips: Vec<String> = store
            .entries_of(IndicatorKind::IpAddress)
            .map(|entry| entry.value.clone())
            .collect();

        info!(
            "Enriching {} ip addresses with {} worker(s)",
            ips.len(),
            self.workers
        );

        stream::iter(ips.into_iter().map(|ip| async move {
            let result = client.enrich(&ip).await;
            if let Some(progress) = progress {
                if result.is_success() {
                    progress.inc_processed();
                } else {
                    progress.inc_failed();
                }
            }
            (ip, result)
        }))
        .buffer_unordered(self.workers)
        .collect::<HashMap<_, _>>()
        .await
    }
}
