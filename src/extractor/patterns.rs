// file: src/extractor/patterns.rs
// description: compiled regex patterns and the ordered pattern registry
// reference: https://docs.rs/regex

use crate::error::{PipelineError, Result};
use crate::models::IndicatorKind;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

/// Characters allowed to surround a match, e.g. `">jos@ir.nl<"` yields `jos@ir.nl`.
pub const DEFAULT_BOUNDARY_CHARS: &str = " \t<>\"':;,.()";

pub const DEFAULT_CUSTOM_PATTERN: &str = "EnterYourCustomIndicatorHere";

pub const URL_CORE: &str = r"h[tx][tx]ps?://(?:[-\w.]|%[\da-fA-F]{2})+";
pub const EMAIL_CORE: &str = r"[a-zA-Z0-9]+[._]?[a-zA-Z0-9]+@\w+\.\w{2,3}";
pub const MOBILE_CORE: &str = r"\+?\(?[0-9]{2,3}\)?[-\s.]?[0-9]{3}[-\s.]?[0-9]{4,6}";
pub const IPV4_CORE: &str = r"[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}";
pub const MD5_CORE: &str = r"[a-fA-F0-9]{32}";
pub const SHA1_CORE: &str = r"[a-fA-F0-9]{40}";
pub const SHA256_CORE: &str = r"[a-fA-F0-9]{64}";

lazy_static! {
    static ref DEFAULT_PATTERNS: HashMap<IndicatorKind, Regex> = {
        let mut patterns = HashMap::new();
        for kind in IndicatorKind::DEFAULT_PRIORITY {
            if let Some(core) = core_pattern(kind) {
                let regex = Regex::new(&wrap(kind, core, DEFAULT_BOUNDARY_CHARS))
                    .expect("built-in indicator regex is valid");
                patterns.insert(kind, regex);
            }
        }
        patterns
    };
}

fn core_pattern(kind: IndicatorKind) -> Option<&'static str> {
    match kind {
        IndicatorKind::IpAddress => Some(IPV4_CORE),
        IndicatorKind::Email => Some(EMAIL_CORE),
        IndicatorKind::MobilePhone => Some(MOBILE_CORE),
        IndicatorKind::Url => Some(URL_CORE),
        IndicatorKind::Md5 => Some(MD5_CORE),
        IndicatorKind::Sha1 => Some(SHA1_CORE),
        IndicatorKind::Sha256 => Some(SHA256_CORE),
        IndicatorKind::Custom => None,
    }
}

/// Hashes must not touch other hex digits, so a sha1 never yields an md5.
fn hex_bounded(core: &str) -> String {
    format!("(?:^|[^0-9a-fA-F])({core})(?:$|[^0-9a-fA-F])")
}

fn wrap(kind: IndicatorKind, core: &str, boundary_chars: &str) -> String {
    match kind {
        IndicatorKind::Md5 | IndicatorKind::Sha1 | IndicatorKind::Sha256 => hex_bounded(core),
        _ => bounded(core, boundary_chars),
    }
}

/// Wraps a core pattern in optional boundary characters and captures the core as group 1.
fn bounded(core: &str, boundary_chars: &str) -> String {
    if boundary_chars.is_empty() {
        return format!("({})", core);
    }

    let class: String = boundary_chars
        .chars()
        .map(|c| regex::escape(&c.to_string()))
        .collect();

    format!("[{class}]?({core})[{class}]?")
}

#[derive(Debug, Clone)]
pub struct PatternDefinition {
    pub kind: IndicatorKind,
    pub regex: Regex,
}

impl PatternDefinition {
    /// Returns the trimmed core of the leftmost match.
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex
            .captures(text)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str())
    }
}

/// Ordered, immutable set of patterns. The order is the tie-break priority.
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    definitions: Vec<PatternDefinition>,
}

impl PatternRegistry {
    pub fn build(
        requested: &[IndicatorKind],
        custom_pattern: &str,
        boundary_chars: &str,
    ) -> Result<Self> {
        if requested.is_empty() {
            return Err(PipelineError::Config(
                "at least one indicator kind must be requested".to_string(),
            ));
        }

        let mut definitions: Vec<PatternDefinition> = Vec::with_capacity(requested.len());

        for &kind in requested {
            if definitions.iter().any(|d| d.kind == kind) {
                continue;
            }

            let regex = match core_pattern(kind) {
                Some(_) if boundary_chars == DEFAULT_BOUNDARY_CHARS => {
                    DEFAULT_PATTERNS[&kind].clone()
                }
                Some(core) => compile(kind, &wrap(kind, core, boundary_chars))?,
                None => compile(kind, &bounded(custom_pattern, boundary_chars))?,
            };

            definitions.push(PatternDefinition { kind, regex });
        }

        Ok(Self { definitions })
    }

    /// Registry used when re-scanning rows for IP addresses.
    pub fn ip_only() -> Self {
        Self {
            definitions: vec![PatternDefinition {
                kind: IndicatorKind::IpAddress,
                regex: DEFAULT_PATTERNS[&IndicatorKind::IpAddress].clone(),
            }],
        }
    }

    pub fn pattern_for(&self, kind: IndicatorKind) -> Option<&PatternDefinition> {
        self.definitions.iter().find(|d| d.kind == kind)
    }

    pub fn kinds(&self) -> Vec<IndicatorKind> {
        self.definitions.iter().map(|d| d.kind).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatternDefinition> {
        self.definitions.iter()
    }
}

fn compile(kind: IndicatorKind, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        PipelineError::Config(format!("Invalid pattern for {}: {}", kind, e))
    })
}
