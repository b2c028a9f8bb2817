// file: src/main.rs
// description: commandline application entry point
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use ioc_harvest::utils::logging::{
    format_info, format_result_table, format_success, format_warning, init_logger,
};
use ioc_harvest::{Config, PipelineError, PipelineOrchestrator};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "ioc_harvest")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(
    about = "Extract indicators of compromise from documents and enrich IP addresses",
    long_about = None
)]
struct Cli {
    /// Input files or directories (csv, txt, xlsx, xls, docx, pdf)
    #[arg(short, long, value_name = "PATH", num_args = 1.., required = true)]
    input: Vec<PathBuf>,

    /// Indicator kinds in priority order, e.g. `-s ip email url`
    #[arg(short, long, value_name = "KIND", num_args = 1..)]
    search: Vec<String>,

    /// Do not look up IP addresses
    #[arg(long, action = ArgAction::SetTrue)]
    skip_enrich: bool,

    /// Write `<input>_enriched.csv` copies of csv inputs with an extra enrichment column
    #[arg(long, action = ArgAction::SetTrue)]
    enrich_existing: bool,

    /// Seconds to wait after every lookup
    #[arg(short, long, value_name = "SECONDS")]
    delay: Option<f64>,

    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// File holding the ipinfo access token
    #[arg(short = 'a', long, value_name = "FILE")]
    token_path: Option<PathBuf>,

    #[arg(long, value_name = "CHAR")]
    delimiter: Option<String>,

    #[arg(long, value_name = "CHAR")]
    quote: Option<String>,

    #[arg(long, value_name = "LABEL")]
    encoding: Option<String>,

    /// Concurrent lookups
    #[arg(long, value_name = "NUM")]
    workers: Option<usize>,

    /// Regular expression for the `custom` kind
    #[arg(long, value_name = "REGEX")]
    custom_pattern: Option<String>,

    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

impl Cli {
    /// CLI flags take precedence over file and environment settings.
    fn apply(self, mut config: Config) -> Config {
        config.input.paths = self.input;
        if !self.search.is_empty() {
            config.extraction.search = self.search;
        }
        if self.skip_enrich {
            config.enrichment.enabled = false;
        }
        if self.enrich_existing {
            config.output.enrich_existing = true;
        }
        if let Some(delay) = self.delay {
            config.enrichment.delay_secs = delay;
        }
        if let Some(output) = self.output {
            config.output.path = output;
        }
        if let Some(token_path) = self.token_path {
            config.enrichment.token_path = token_path;
        }
        if let Some(delimiter) = self.delimiter {
            config.input.csv.delimiter = delimiter;
        }
        if let Some(quote) = self.quote {
            config.input.csv.quote = quote;
        }
        if let Some(encoding) = self.encoding {
            config.input.csv.encoding = encoding;
        }
        if let Some(workers) = self.workers {
            config.enrichment.parallel_workers = workers;
        }
        if let Some(custom_pattern) = self.custom_pattern {
            config.extraction.custom_pattern = custom_pattern;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logger(cli.color, cli.verbose);

    info!("IOC harvest");
    if let Some(path) = &cli.config {
        info!("Loading configuration from: {}", path.display());
    }

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let color = cli.color;
    let config = cli.apply(config);

    let orchestrator = PipelineOrchestrator::new(config)
        .context("Invalid configuration")?
        .with_color(color);

    let outcome = match orchestrator.run().await {
        Ok(outcome) => outcome,
        Err(PipelineError::EmptyResult) => {
            eprintln!("{}", format_warning("No indicators found, no report written"));
            return Err(PipelineError::EmptyResult.into());
        }
        Err(e) => return Err(e).context("Harvest failed"),
    };

    println!("{}", format_result_table(&outcome.records));
    println!(
        "{}",
        format_success(&format!(
            "Wrote {} indicators to {}",
            outcome.records.len(),
            outcome.output_path.display()
        ))
    );
    for path in &outcome.enriched_files {
        println!(
            "{}",
            format_info(&format!("Re-enriched copy: {}", path.display()))
        );
    }
    println!("{}", format_info(&outcome.stats.summary()));

    Ok(())
}
