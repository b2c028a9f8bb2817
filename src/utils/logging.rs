// file: src/utils/logging.rs
// description: Tracing subscriber initialization and colored console formatting
// reference: https://docs.rs/tracing-subscriber

use crate::models::ReportRecord;
use colored::*;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Logs go to stderr so the result table on stdout stays clean. `RUST_LOG` overrides the level.
pub fn init_logger(colored_output: bool, verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(verbose)
        .with_line_number(verbose)
        .compact()
        .with_ansi(colored_output);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();

    colored::control::set_override(colored_output);
}

pub fn format_success(msg: &str) -> String {
    format!("{} {}", "✓".green().bold(), msg.green())
}

pub fn format_warning(msg: &str) -> String {
    format!("{} {}", "⚠".yellow().bold(), msg.yellow())
}

pub fn format_info(msg: &str) -> String {
    format!("{} {}", "ℹ".blue().bold(), msg)
}

/// `Regex result / Count / Type` table of the report, one line per record.
pub fn format_result_table(records: &[ReportRecord]) -> String {
    let value_width = records
        .iter()
        .map(|r| r.value.chars().count())
        .chain(std::iter::once("Regex result".len()))
        .max()
        .unwrap_or_default();

    let mut table = format!(
        "{}  {}  {}\n",
        format!("{:<value_width$}", "Regex result").bold(),
        format!("{:>5}", "Count").bold(),
        "Type".bold(),
    );
    for record in records {
        table.push_str(&format!(
            "{:<value_width$}  {:>5}  {}\n",
            record.value,
            record.count,
            record.kind.as_str().cyan()
        ));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AggregationEntry, IndicatorKind};
    use regex::Regex;

    fn plain(text: &str) -> String {
        Regex::new("\x1b\\[[0-9;]*m")
            .unwrap()
            .replace_all(text, "")
            .to_string()
    }

    #[test]
    fn test_result_table() {
        let mut entry =
            AggregationEntry::new("8.8.8.8".to_string(), IndicatorKind::IpAddress, "a.csv");
        entry.observe("a.csv");
        let records = vec![ReportRecord::from_entry(&entry)];

        let table = plain(&format_result_table(&records));
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Regex result  Count  Type");
        assert_eq!(lines[1], "8.8.8.8           2  ip_address");
    }

    #[test]
    fn test_result_table_header_aligned_with_color() {
        colored::control::set_override(true);
        let entry = AggregationEntry::new(
            "https://malicious.example.org".to_string(),
            IndicatorKind::Url,
            "a.csv",
        );
        let table = format_result_table(&[ReportRecord::from_entry(&entry)]);
        colored::control::unset_override();

        assert!(table.contains('\u{1b}'));
        let table = plain(&table);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], format!("{:<29}  Count  Type", "Regex result"));
        assert_eq!(lines[1], "https://malicious.example.org      1  url");
    }
}
