// file: src/sources/spreadsheet.rs
// description: spreadsheet reader over every sheet, row by row then column
// reference: https://docs.rs/calamine

use crate::error::{PipelineError, Result};
use crate::sources::SourceReader;
use calamine::{Reader, open_workbook_auto};
use std::path::Path;
use tracing::debug;

pub struct SpreadsheetReader;

impl SourceReader for SpreadsheetReader {
    fn read_segments(&self, path: &Path) -> Result<Vec<String>> {
        let mut workbook =
            open_workbook_auto(path).map_err(|e| PipelineError::source_read(path, e))?;

        let mut segments = Vec::new();
        for sheet in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&sheet)
                .map_err(|e| PipelineError::source_read(path, format!("sheet {}: {}", sheet, e)))?;

            debug!(
                "Reading sheet '{}' ({} rows) of {}",
                sheet,
                range.height(),
                path.display()
            );

            for row in range.rows() {
                for cell in row {
                    let text = cell.to_string();
                    if !text.trim().is_empty() {
                        segments.push(text);
                    }
                }
            }
        }

        Ok(segments)
    }
}
