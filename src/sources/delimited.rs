// file: src/sources/delimited.rs
// description: csv and plain text reader with configurable dialect and encoding
// reference: https://docs.rs/csv

use crate::config::CsvOptions;
use crate::error::{PipelineError, Result};
use crate::sources::SourceReader;
use encoding_rs::Encoding;
use std::borrow::Cow;
use std::fs;
use std::path::Path;

pub struct DelimitedReader {
    options: CsvOptions,
}

impl DelimitedReader {
    pub fn new(options: CsvOptions) -> Self {
        Self { options }
    }

    /// Reads every row of `path` as a list of fields.
    pub fn read_rows(&self, path: &Path) -> Result<Vec<Vec<String>>> {
        let bytes = fs::read(path).map_err(|e| PipelineError::source_read(path, e))?;
        let text = decode(&bytes, self.options.encoding()?)
            .map_err(|message| PipelineError::source_read(path, message))?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.options.delimiter_byte()?)
            .quote(self.options.quote_byte()?)
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| PipelineError::source_read(path, e))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(rows)
    }
}

impl SourceReader for DelimitedReader {
    fn read_segments(&self, path: &Path) -> Result<Vec<String>> {
        Ok(self
            .read_rows(path)?
            .into_iter()
            .flatten()
            .filter(|field| !field.trim().is_empty())
            .collect())
    }
}

/// Decodes `bytes` strictly. A byte order mark overrides the configured encoding.
pub fn decode<'a>(
    bytes: &'a [u8],
    configured: &'static Encoding,
) -> std::result::Result<Cow<'a, str>, String> {
    let (encoding, bom_length) = Encoding::for_bom(bytes).unwrap_or((configured, 0));

    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes[bom_length..])
        .ok_or_else(|| {
            format!(
                "content is not valid {} text, try another --encoding",
                encoding.name()
            )
        })
}

/// Encodes `text` for writing. Encodings without an encoder (UTF-16) fall back to UTF-8.
pub fn encode<'a>(text: &'a str, encoding: &'static Encoding) -> Cow<'a, [u8]> {
    let (bytes, _, _) = encoding.encode(text);
    bytes
}
