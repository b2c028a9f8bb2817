// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{PipelineError, Result};
use crate::extractor::patterns::{DEFAULT_BOUNDARY_CHARS, DEFAULT_CUSTOM_PATTERN};
use crate::models::IndicatorKind;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub input: InputConfig,
    pub extraction: ExtractionConfig,
    pub enrichment: EnrichmentConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    #[serde(default)]
    pub paths: Vec<PathBuf>,
    pub csv: CsvOptions,
}

/// Dialect used for reading delimited sources and writing csv output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CsvOptions {
    pub delimiter: String,
    pub quote: String,
    pub encoding: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionConfig {
    pub search: Vec<String>,
    pub custom_pattern: String,
    pub boundary_chars: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnrichmentConfig {
    pub enabled: bool,
    pub token_path: PathBuf,
    pub delay_secs: f64,
    pub parallel_workers: usize,
    pub timeout_secs: u64,
    pub base_url: String,
    pub probe_ip: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub enrich_existing: bool,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let defaults = config::Config::try_from(&Self::default_config())
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder
                .add_source(config::File::from(Path::new(DEFAULT_CONFIG_PATH)).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("IOC_HARVEST")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("input.paths")
                .with_list_parse_key("extraction.search")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            input: InputConfig {
                paths: vec![],
                csv: CsvOptions::default(),
            },
            extraction: ExtractionConfig {
                search: IndicatorKind::DEFAULT_PRIORITY
                    .iter()
                    .map(|kind| kind.as_str().to_string())
                    .collect(),
                custom_pattern: DEFAULT_CUSTOM_PATTERN.to_string(),
                boundary_chars: DEFAULT_BOUNDARY_CHARS.to_string(),
            },
            enrichment: EnrichmentConfig {
                enabled: true,
                token_path: PathBuf::from("ip_info.key"),
                delay_secs: 0.0,
                parallel_workers: 1,
                timeout_secs: 30,
                base_url: "https://ipinfo.io".to_string(),
                probe_ip: "8.8.8.8".to_string(),
            },
            output: OutputConfig {
                path: default_output_path(),
                enrich_existing: false,
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.input.csv.delimiter_byte()?;
        self.input.csv.quote_byte()?;
        self.input.csv.encoding()?;
        self.extraction.kinds()?;

        if self.enrichment.parallel_workers == 0 {
            return Err(PipelineError::Config(
                "parallel_workers must be greater than 0".to_string(),
            ));
        }

        Duration::try_from_secs_f64(self.enrichment.delay_secs).map_err(|e| {
            PipelineError::Config(format!(
                "delay_secs must be a non-negative number of seconds, got {}: {}",
                self.enrichment.delay_secs, e
            ))
        })?;

        if self.enrichment.timeout_secs == 0 {
            return Err(PipelineError::Config(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl ExtractionConfig {
    /// Requested kinds in priority order.
    pub fn kinds(&self) -> Result<Vec<IndicatorKind>> {
        IndicatorKind::parse_list(&self.search)
    }
}

impl EnrichmentConfig {
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay_secs).unwrap_or_default()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            quote: "\"".to_string(),
            encoding: "UTF-8".to_string(),
        }
    }
}

impl CsvOptions {
    pub fn delimiter_byte(&self) -> Result<u8> {
        single_byte("delimiter", &self.delimiter)
    }

    pub fn quote_byte(&self) -> Result<u8> {
        single_byte("quote", &self.quote)
    }

    pub fn encoding(&self) -> Result<&'static encoding_rs::Encoding> {
        encoding_rs::Encoding::for_label(self.encoding.trim().as_bytes()).ok_or_else(|| {
            PipelineError::Config(format!("Unknown text encoding '{}'", self.encoding))
        })
    }
}

fn single_byte(name: &str, value: &str) -> Result<u8> {
    let value = if value == "\\t" { "\t" } else { value };
    match value.as_bytes() {
        [byte] => Ok(*byte),
        _ => Err(PipelineError::Config(format!(
            "{} must be a single ASCII character, got '{}'",
            name, value
        ))),
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from(format!(
        "{}_results.csv",
        chrono::Local::now().format("%Y-%m-%d_%H%M%S")
    ))
}
