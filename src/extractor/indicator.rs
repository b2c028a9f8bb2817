// file: src/extractor/indicator.rs
// description: first-match indicator extraction over tokenized fragments
// reference: threat intelligence ioc standards

use crate::extractor::patterns::PatternRegistry;
use crate::extractor::scope::is_eligible;
use crate::models::{IndicatorKind, IndicatorMatch};
use tracing::debug;

/// Characters that separate several indicators on one line, e.g. `"8.8.8.8  9.9.9.9"`.
pub const SPLIT_CHARS: [char; 4] = [',', ';', '\t', ' '];

/// Splits a line, cell or paragraph into candidate fragments.
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(SPLIT_CHARS).filter(|token| !token.is_empty())
}

pub struct IndicatorExtractor {
    registry: PatternRegistry,
}

impl IndicatorExtractor {
    pub fn new(registry: PatternRegistry) -> Self {
        Self { registry }
    }

    /// Returns the first requested kind that matches, in registry order.
    ///
    /// An IP match outside public scope is dropped and the remaining kinds are tried.
    pub fn extract(&self, fragment: &str) -> Option<IndicatorMatch> {
        for definition in self.registry.iter() {
            let Some(value) = definition.find(fragment) else {
                continue;
            };

            if definition.kind == IndicatorKind::IpAddress && !is_eligible(value) {
                debug!("IP address '{}' is not a public ipv4 address", value);
                continue;
            }

            return Some(IndicatorMatch::new(definition.kind, value));
        }

        None
    }

    /// Tokenizes `text` and extracts at most one indicator per token.
    pub fn extract_all(&self, text: &str) -> Vec<IndicatorMatch> {
        tokenize(text).filter_map(|token| self.extract(token)).collect()
    }
}
