// file: src/sources/mod.rs
// description: document source readers and input discovery
// reference: internal module structure

pub mod delimited;
pub mod pdf;
pub mod scanner;
pub mod spreadsheet;
pub mod word;

pub use delimited::DelimitedReader;
pub use pdf::PdfReader;
pub use scanner::{InputScanner, ScannedSource};
pub use spreadsheet::SpreadsheetReader;
pub use word::WordReader;

use crate::config::CsvOptions;
use crate::error::Result;
use std::path::Path;

/// Produces the raw text segments (lines, cells, paragraphs, link targets) of one source.
pub trait SourceReader {
    fn read_segments(&self, path: &Path) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Delimited,
    Spreadsheet,
    Word,
    Pdf,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" | "txt" => Some(SourceFormat::Delimited),
            "xlsx" | "xlsm" | "xls" | "ods" => Some(SourceFormat::Spreadsheet),
            "docx" => Some(SourceFormat::Word),
            "pdf" => Some(SourceFormat::Pdf),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Delimited => "delimited text",
            SourceFormat::Spreadsheet => "spreadsheet",
            SourceFormat::Word => "word document",
            SourceFormat::Pdf => "pdf",
        }
    }

    pub fn reader(&self, csv: &CsvOptions) -> Box<dyn SourceReader> {
        match self {
            SourceFormat::Delimited => Box::new(DelimitedReader::new(csv.clone())),
            SourceFormat::Spreadsheet => Box::new(SpreadsheetReader),
            SourceFormat::Word => Box::new(WordReader),
            SourceFormat::Pdf => Box::new(PdfReader),
        }
    }
}
