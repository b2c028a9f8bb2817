// file: src/extractor/mod.rs
// description: indicator extraction module exports
// reference: internal module structure

pub mod indicator;
pub mod patterns;
pub mod scope;

pub use indicator::{IndicatorExtractor, tokenize};
pub use patterns::{PatternDefinition, PatternRegistry};
pub use scope::is_eligible;
