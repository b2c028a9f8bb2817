// file: src/report/mod.rs
// description: report assembly, csv output and re-enrichment of input files
// reference: internal module structure

pub mod assembler;
pub mod reenrich;
pub mod writer;

pub use assembler::ReportAssembler;
pub use reenrich::{enriched_path, reenrich_file};
pub use writer::ReportWriter;
