// file: src/sources/scanner.rs
// description: Input path resolution with directory walking and file filtering
// reference: https://docs.rs/walkdir

use crate::error::{PipelineError, Result};
use crate::sources::SourceFormat;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Suffix of files produced by re-enrichment. They are never read back as inputs.
pub const ENRICHED_SUFFIX: &str = "_enriched.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedSource {
    pub path: PathBuf,
    pub source_id: String,
    pub format: SourceFormat,
}

pub struct InputScanner;

impl InputScanner {
    /// Resolves input paths to readable sources, walking directories in name order.
    pub fn resolve(paths: &[PathBuf]) -> Result<Vec<ScannedSource>> {
        let mut sources = Vec::new();
        let mut seen = HashSet::new();

        for path in paths {
            if path.is_dir() {
                info!("Scanning directory: {}", path.display());
                for entry in WalkDir::new(path)
                    .follow_links(false)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_map(|e| e.ok())
                {
                    if entry.file_type().is_file() {
                        Self::consider(entry.path(), &mut sources, &mut seen);
                    }
                }
            } else if path.is_file() {
                Self::consider(path, &mut sources, &mut seen);
            } else {
                warn!("Path {} does not exist, skipping", path.display());
            }
        }

        if sources.is_empty() {
            return Err(PipelineError::Config(
                "No input path resolves to a readable source file (accepted: csv, txt, xlsx, xls, docx, pdf)"
                    .to_string(),
            ));
        }

        info!("Found {} source files", sources.len());
        Ok(sources)
    }

    fn consider(path: &Path, sources: &mut Vec<ScannedSource>, seen: &mut HashSet<PathBuf>) {
        if Self::should_skip(path) {
            debug!("Skipping file: {}", path.display());
            return;
        }

        let Some(format) = SourceFormat::from_path(path) else {
            debug!("Skipping unsupported file type: {}", path.display());
            return;
        };

        if !seen.insert(path.to_path_buf()) {
            return;
        }

        sources.push(ScannedSource {
            path: path.to_path_buf(),
            source_id: path.display().to_string(),
            format,
        });
    }

    /// Office lock files and generated enrichment copies.
    pub fn should_skip(path: &Path) -> bool {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        name.starts_with("~$") || name.ends_with(ENRICHED_SUFFIX)
    }
}
