// file: src/pipeline/orchestrator.rs
// description: coordinates input resolution, extraction, enrichment and report output
// reference: orchestrates asynchronous harvesting workflow

use crate::aggregation::AggregationStore;
use crate::config::{Config, CsvOptions};
use crate::enrichment::EnrichmentClient;
use crate::error::{PipelineError, Result};
use crate::extractor::{IndicatorExtractor, PatternRegistry, tokenize};
use crate::models::{IndicatorKind, ReportRecord};
use crate::pipeline::progress::{PipelineStats, ProgressTracker};
use crate::report::{ReportAssembler, ReportWriter, enriched_path, reenrich_file};
use crate::sources::{InputScanner, ScannedSource, SourceFormat};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// What a completed run produced.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub records: Vec<ReportRecord>,
    pub output_path: PathBuf,
    pub enriched_files: Vec<PathBuf>,
    pub stats: PipelineStats,
}

pub struct PipelineOrchestrator {
    config: Config,
    client: Option<Arc<EnrichmentClient>>,
    show_progress: bool,
    color: bool,
}

impl PipelineOrchestrator {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            client: None,
            show_progress: true,
            color: true,
        })
    }

    /// Uses `client` instead of building an ipinfo client from the token file.
    pub fn with_enrichment_client(mut self, client: EnrichmentClient) -> Self {
        self.client = Some(Arc::new(client));
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Progress bars stay visible without color.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub async fn run(&self) -> Result<PipelineOutcome> {
        let start = Instant::now();
        info!("Starting indicator harvest");

        let kinds = self.config.extraction.kinds()?;
        let registry = PatternRegistry::build(
            &kinds,
            &self.config.extraction.custom_pattern,
            &self.config.extraction.boundary_chars,
        )?;
        info!(
            "Searching for: {}",
            kinds
                .iter()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let sources = InputScanner::resolve(&self.config.input.paths)?;

        let client = self.enrichment_client().await?;

        let progress = Arc::new(self.tracker(sources.len(), "sources"));
        let extraction = {
            let extractor = IndicatorExtractor::new(registry);
            let sources = sources.clone();
            let csv = self.config.input.csv.clone();
            let progress = progress.clone();
            tokio::task::spawn_blocking(move || {
                extract_sources(&extractor, &sources, &csv, Some(progress.as_ref()))
            })
            .await
            .map_err(|e| PipelineError::Validation(format!("Extraction task failed: {}", e)))?
        };
        progress.finish();

        let mut stats = PipelineStats {
            sources_read: extraction.sources_read,
            sources_failed: extraction.sources_failed,
            indicators: extraction.store.len(),
            occurrences: extraction.store.total_occurrences(),
            ..PipelineStats::new()
        };

        if extraction.store.is_empty() {
            warn!("No indicators found, no report written");
            return Err(PipelineError::EmptyResult);
        }

        info!(
            "Found {} distinct indicators in {} sources",
            extraction.store.len(),
            extraction.sources_read
        );

        let lookups = client.as_ref().map(|_| {
            self.tracker(
                extraction
                    .store
                    .entries_of(IndicatorKind::IpAddress)
                    .count(),
                "lookups",
            )
        });
        let records = ReportAssembler::new(self.config.enrichment.parallel_workers)
            .assemble(&extraction.store, client.as_deref(), lookups.as_ref())
            .await;
        if let Some(lookups) = &lookups {
            lookups.finish();
        }

        let output_path = self.config.output.path.clone();
        ReportWriter::new(self.config.input.csv.clone()).write(&output_path, &records)?;

        let enriched_files = if self.config.output.enrich_existing {
            self.reenrich_inputs(&sources, client.as_deref()).await?
        } else {
            Vec::new()
        };

        if let Some(client) = &client {
            stats.lookups = client.lookups_performed();
            stats.lookups_failed = client.lookups_failed();
        }
        stats.duration_secs = start.elapsed().as_secs_f64();
        self.log_final_stats(&stats);

        Ok(PipelineOutcome {
            records,
            output_path,
            enriched_files,
            stats,
        })
    }

    async fn enrichment_client(&self) -> Result<Option<Arc<EnrichmentClient>>> {
        if !self.config.enrichment.enabled {
            info!("Enrichment disabled");
            return Ok(None);
        }

        let client = match &self.client {
            Some(client) => client.clone(),
            None => Arc::new(EnrichmentClient::from_config(&self.config.enrichment)?),
        };
        client.probe(&self.config.enrichment.probe_ip).await?;
        Ok(Some(client))
    }

    async fn reenrich_inputs(
        &self,
        sources: &[ScannedSource],
        client: Option<&EnrichmentClient>,
    ) -> Result<Vec<PathBuf>> {
        let Some(client) = client else {
            warn!("Enrichment is disabled, input files are not re-enriched");
            return Ok(Vec::new());
        };

        let mut written = Vec::new();
        for source in sources.iter().filter(|s| is_csv(s)) {
            let target = enriched_path(&source.path);
            match reenrich_file(&source.path, &target, client, &self.config.input.csv).await {
                Ok(_) => written.push(target),
                Err(e) if !e.is_fatal() => error!("{}", e),
                Err(e) => return Err(e),
            }
        }

        Ok(written)
    }

    fn tracker(&self, total: usize, label: &str) -> ProgressTracker {
        if self.show_progress {
            ProgressTracker::with_color(total, label, self.color)
        } else {
            ProgressTracker::hidden()
        }
    }

    fn log_final_stats(&self, stats: &PipelineStats) {
        info!("=== Harvest Summary ===");
        info!("Duration: {:.2} seconds", stats.duration_secs);
        info!("Sources read: {}", stats.sources_read);
        info!("Sources failed: {}", stats.sources_failed);
        info!("Distinct indicators: {}", stats.indicators);
        info!("Total matches: {}", stats.occurrences);
        if stats.lookups > 0 {
            info!("Lookups: {}", stats.lookups);
            info!("Lookup success rate: {:.2}%", stats.lookup_success_rate());
        }
        info!("=======================");
    }
}

/// Aggregated indicators plus per-source outcome counts.
#[derive(Debug, Default)]
pub struct ExtractionSummary {
    pub store: AggregationStore,
    pub sources_read: usize,
    pub sources_failed: usize,
}

/// Reads every source in order and records at most one indicator per fragment.
/// A source that cannot be read is logged and skipped.
pub fn extract_sources(
    extractor: &IndicatorExtractor,
    sources: &[ScannedSource],
    csv: &CsvOptions,
    progress: Option<&ProgressTracker>,
) -> ExtractionSummary {
    let mut summary = ExtractionSummary::default();

    for source in sources {
        info!("Reading {} ({})", source.source_id, source.format.as_str());

        let segments = match source.format.reader(csv).read_segments(&source.path) {
            Ok(segments) => segments,
            Err(e) => {
                error!("{}", e);
                summary.sources_failed += 1;
                if let Some(progress) = progress {
                    progress.inc_failed();
                }
                continue;
            }
        };

        let before = summary.store.total_occurrences();
        for segment in &segments {
            for fragment in tokenize(segment) {
                if let Some(found) = extractor.extract(fragment) {
                    summary.store.record_match(&found, &source.source_id);
                }
            }
        }

        info!(
            "{} matches in {}",
            summary.store.total_occurrences() - before,
            source.source_id
        );
        summary.sources_read += 1;
        if let Some(progress) = progress {
            progress.inc_processed();
        }
    }

    summary
}

fn is_csv(source: &ScannedSource) -> bool {
    source.format == SourceFormat::Delimited
        && source
            .path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}
