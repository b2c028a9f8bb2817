// file: src/models/indicator.rs
// description: indicator kinds, matches and aggregated entries
// reference: stix ioc standards

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    IpAddress,
    Email,
    MobilePhone,
    Url,
    Md5,
    Sha1,
    Sha256,
    Custom,
}

impl IndicatorKind {
    /// Default search order. Earlier kinds win when a fragment matches several patterns.
    pub const DEFAULT_PRIORITY: [IndicatorKind; 8] = [
        IndicatorKind::IpAddress,
        IndicatorKind::MobilePhone,
        IndicatorKind::Email,
        IndicatorKind::Url,
        IndicatorKind::Md5,
        IndicatorKind::Sha1,
        IndicatorKind::Sha256,
        IndicatorKind::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKind::IpAddress => "ip_address",
            IndicatorKind::Email => "email",
            IndicatorKind::MobilePhone => "mobile_phone",
            IndicatorKind::Url => "url",
            IndicatorKind::Md5 => "md5",
            IndicatorKind::Sha1 => "sha1",
            IndicatorKind::Sha256 => "sha256",
            IndicatorKind::Custom => "custom",
        }
    }

    /// Parses an ordered list of kind names, keeping the first occurrence of duplicates.
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<IndicatorKind>, PipelineError> {
        let mut kinds = Vec::with_capacity(names.len());
        for name in names {
            let kind: IndicatorKind = name.as_ref().parse()?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        Ok(kinds)
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ip_address" | "ipaddress" | "ip" => Ok(IndicatorKind::IpAddress),
            "email" | "e-mail" => Ok(IndicatorKind::Email),
            "mobile_phone" | "mobile" | "phone" => Ok(IndicatorKind::MobilePhone),
            "url" => Ok(IndicatorKind::Url),
            "md5" => Ok(IndicatorKind::Md5),
            "sha1" => Ok(IndicatorKind::Sha1),
            "sha256" => Ok(IndicatorKind::Sha256),
            "custom" => Ok(IndicatorKind::Custom),
            other => Err(PipelineError::Config(format!(
                "Unknown indicator kind '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorMatch {
    pub kind: IndicatorKind,
    pub value: String,
}

impl IndicatorMatch {
    pub fn new(kind: IndicatorKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// One distinct indicator value with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregationEntry {
    pub value: String,
    pub kind: IndicatorKind,
    pub count: u64,
    pub sources: Vec<String>,
}

impl AggregationEntry {
    pub fn new(value: String, kind: IndicatorKind, source_id: &str) -> Self {
        Self {
            value,
            kind,
            count: 1,
            sources: vec![source_id.to_string()],
        }
    }

    pub fn observe(&mut self, source_id: &str) {
        self.count += 1;
        if !self.sources.iter().any(|s| s == source_id) {
            self.sources.push(source_id.to_string());
        }
    }

    pub fn sources_joined(&self) -> String {
        self.sources.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_aliases() {
        assert_eq!(
            "ipaddress".parse::<IndicatorKind>().unwrap(),
            IndicatorKind::IpAddress
        );
        assert_eq!(
            "Mobile".parse::<IndicatorKind>().unwrap(),
            IndicatorKind::MobilePhone
        );
        assert_eq!(
            "sha256".parse::<IndicatorKind>().unwrap(),
            IndicatorKind::Sha256
        );
        assert!(matches!(
            "bitcoin".parse::<IndicatorKind>(),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn test_parse_list_keeps_order_and_drops_duplicates() {
        let kinds = IndicatorKind::parse_list(&["url", "email", "url"]).unwrap();
        assert_eq!(kinds, vec![IndicatorKind::Url, IndicatorKind::Email]);
    }

    #[test]
    fn test_entry_observe() {
        let mut entry = AggregationEntry::new("8.8.8.8".to_string(), IndicatorKind::IpAddress, "a.csv");
        entry.observe("a.csv");
        entry.observe("b.docx");

        assert_eq!(entry.count, 3);
        assert_eq!(entry.sources, vec!["a.csv", "b.docx"]);
        assert_eq!(entry.sources_joined(), "a.csv; b.docx");
    }
}
