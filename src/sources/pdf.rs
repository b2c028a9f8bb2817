// file: src/sources/pdf.rs
// description: pdf text reader, one segment per extracted line
// reference: https://docs.rs/pdf-extract

use crate::error::{PipelineError, Result};
use crate::sources::SourceReader;
use std::panic;
use std::path::Path;

pub struct PdfReader;

impl SourceReader for PdfReader {
    fn read_segments(&self, path: &Path) -> Result<Vec<String>> {
        // pdf-extract panics on some malformed documents
        let text = panic::catch_unwind(|| pdf_extract::extract_text(path))
            .map_err(|_| PipelineError::source_read(path, "pdf text extraction aborted"))?
            .map_err(|e| PipelineError::source_read(path, e))?;

        Ok(lines(&text))
    }
}

fn lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
