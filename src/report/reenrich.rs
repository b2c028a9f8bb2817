// file: src/report/reenrich.rs
// description: appends cached ip enrichment to the rows of an existing delimited file
// reference: https://docs.rs/csv/latest/csv/enum.QuoteStyle.html

use crate::config::CsvOptions;
use crate::enrichment::EnrichmentClient;
use crate::error::{PipelineError, Result};
use crate::extractor::{IndicatorExtractor, PatternRegistry, tokenize};
use crate::sources::DelimitedReader;
use crate::sources::delimited::encode;
use crate::sources::scanner::ENRICHED_SUFFIX;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// `<source>_enriched.csv`, next to the source.
pub fn enriched_path(source: &Path) -> PathBuf {
    let mut name = source.as_os_str().to_os_string();
    name.push(ENRICHED_SUFFIX);
    PathBuf::from(name)
}

/// Copies every row of `source` to `target` with one extra column holding the cached attribute
/// map of the first eligible IP in the row. Returns the number of rows written.
pub async fn reenrich_file(
    source: &Path,
    target: &Path,
    client: &EnrichmentClient,
    options: &CsvOptions,
) -> Result<usize> {
    let rows = DelimitedReader::new(options.clone()).read_rows(source)?;
    let extractor = IndicatorExtractor::new(PatternRegistry::ip_only());

    let mut writer = csv::WriterBuilder::new()
        .delimiter(options.delimiter_byte()?)
        .quote(options.quote_byte()?)
        .quote_style(csv::QuoteStyle::Always)
        .flexible(true)
        .from_writer(Vec::new());

    let mut enriched = 0;
    for mut row in rows.iter().cloned() {
        let full = match first_ip(&extractor, &row) {
            Some(ip) => match client.cached(&ip).await {
                Some(result) => {
                    enriched += 1;
                    result.attributes_json()
                }
                None => {
                    debug!("No cached enrichment for {}", ip);
                    String::new()
                }
            },
            None => String::new(),
        };

        row.push(full);
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| PipelineError::Serialization(e.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|e| PipelineError::Serialization(e.to_string()))?;

    fs::write(target, encode(&text, options.encoding()?)).map_err(|e| {
        PipelineError::FileOperation {
            path: target.to_path_buf(),
            source: e,
        }
    })?;

    info!(
        "Re-enriched {} of {} rows into {}",
        enriched,
        rows.len(),
        target.display()
    );
    Ok(rows.len())
}

fn first_ip(extractor: &IndicatorExtractor, row: &[String]) -> Option<String> {
    row.iter()
        .flat_map(|cell| tokenize(cell))
        .find_map(|fragment| extractor.extract(fragment))
        .map(|found| found.value)
}
