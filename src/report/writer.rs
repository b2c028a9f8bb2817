// file: src/report/writer.rs
// description: writes the indicator report as a delimited file
// reference: https://docs.rs/csv

use crate::config::CsvOptions;
use crate::error::{PipelineError, Result};
use crate::models::{REPORT_HEADER, ReportRecord};
use crate::sources::delimited::encode;
use std::fs;
use std::path::Path;
use tracing::info;

pub struct ReportWriter {
    options: CsvOptions,
}

impl ReportWriter {
    pub fn new(options: CsvOptions) -> Self {
        Self { options }
    }

    /// Writes the header and one row per record to `path`, replacing any existing file.
    pub fn write(&self, path: &Path, records: &[ReportRecord]) -> Result<()> {
        let text = self.render(records)?;
        let bytes = encode(&text, self.options.encoding()?);

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| PipelineError::FileOperation {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(path, bytes).map_err(|e| PipelineError::FileOperation {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!("Wrote {} records to {}", records.len(), path.display());
        Ok(())
    }

    fn render(&self, records: &[ReportRecord]) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.options.delimiter_byte()?)
            .quote(self.options.quote_byte()?)
            .from_writer(Vec::new());

        writer.write_record(REPORT_HEADER)?;
        for record in records {
            writer.write_record(record.to_row())?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| PipelineError::Serialization(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| PipelineError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AggregationEntry, EnrichmentResult, IndicatorKind, IpDetails};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn records() -> Vec<ReportRecord> {
        let mut ip = AggregationEntry::new("8.8.8.8".to_string(), IndicatorKind::IpAddress, "a.csv");
        ip.observe("b.csv");

        let mut attributes = BTreeMap::new();
        attributes.insert("city".to_string(), "Mountain View".to_string());
        let enrichment = EnrichmentResult::from_details(IpDetails {
            city: Some("Mountain View".to_string()),
            country: Some("US".to_string()),
            organization: Some("AS15169 Google LLC".to_string()),
            attributes,
        });

        vec![
            ReportRecord::from_entry(&ip).with_enrichment(&enrichment),
            ReportRecord::from_entry(&AggregationEntry::new(
                "jos@ir.nl".to_string(),
                IndicatorKind::Email,
                "a.csv",
            )),
        ]
    }

    #[test]
    fn test_write_report() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out").join("results.csv");

        ReportWriter::new(CsvOptions::default())
            .write(&path, &records())
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "Regex result,Count,Type,Found in file(s),City,Country,Organization,Full,Error"
        );
        assert_eq!(
            lines[1],
            r#"8.8.8.8,2,ip_address,a.csv; b.csv,Mountain View,US,AS15169 Google LLC,"{""city"":""Mountain View""}","#
        );
        assert_eq!(lines[2], "jos@ir.nl,1,email,a.csv,,,,,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_write_with_delimiter_and_encoding() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("results.csv");
        let options = CsvOptions {
            delimiter: ";".to_string(),
            encoding: "windows-1252".to_string(),
            ..CsvOptions::default()
        };

        let mut entry = AggregationEntry::new("café@ir.nl".to_string(), IndicatorKind::Email, "é.csv");
        entry.observe("b.csv");
        ReportWriter::new(options)
            .write(&path, &[ReportRecord::from_entry(&entry)])
            .unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.contains(&0xE9));
        let (text, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
        assert!(text.contains(r#"café@ir.nl;2;email;"é.csv; b.csv";;;;;"#));
    }
}
