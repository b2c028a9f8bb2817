// file: src/models/enrichment.rs
// description: geolocation and organization data attached to public ip indicators
// reference: https://ipinfo.io/developers/responses

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw answer of the lookup backend before sanitization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpDetails {
    pub city: Option<String>,
    pub country: Option<String>,
    pub organization: Option<String>,
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub city: String,
    pub country: String,
    pub organization: String,
    pub attributes: BTreeMap<String, String>,
    pub error: String,
}

impl EnrichmentResult {
    pub fn from_details(details: IpDetails) -> Self {
        let clean = |value: Option<String>| value.as_deref().map(sanitize).unwrap_or_default();

        Self {
            city: clean(details.city),
            country: clean(details.country),
            organization: clean(details.organization),
            attributes: details
                .attributes
                .into_iter()
                .map(|(key, value)| (key, sanitize(&value)))
                .collect(),
            error: String::new(),
        }
    }

    pub fn degraded(error: impl ToString) -> Self {
        let mut error = error.to_string();
        if error.is_empty() {
            error = "lookup failed".to_string();
        }

        Self {
            error,
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_empty()
    }

    /// JSON object of the attribute map, empty for degraded results.
    pub fn attributes_json(&self) -> String {
        if !self.is_success() {
            return String::new();
        }
        serde_json::to_string(&self.attributes).unwrap_or_default()
    }
}

/// Removes single and double quote characters.
pub fn sanitize(value: &str) -> String {
    value.chars().filter(|c| *c != '\'' && *c != '"').collect()
}
