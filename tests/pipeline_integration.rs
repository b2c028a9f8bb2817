// file: tests/pipeline_integration.rs
// description: end-to-end harvest runs over temporary input trees
// reference: https://docs.rs/tempfile

use async_trait::async_trait;
use ioc_harvest::{
    Config, EnrichmentClient, IndicatorKind, IpDetails, LookupBackend, PipelineError,
    PipelineOrchestrator, Result,
};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

#[derive(Default)]
struct FakeIpInfo {
    calls: AtomicUsize,
}

#[async_trait]
impl LookupBackend for FakeIpInfo {
    fn name(&self) -> &'static str {
        "fake-ipinfo"
    }

    async fn lookup(&self, ip: &str) -> Result<IpDetails> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut attributes = BTreeMap::new();
        attributes.insert("ip".to_string(), ip.to_string());
        attributes.insert("country".to_string(), "US".to_string());
        Ok(IpDetails {
            city: Some("Mountain View".to_string()),
            country: Some("US".to_string()),
            organization: Some("AS15169 Google LLC".to_string()),
            attributes,
        })
    }
}

fn config_for(input: &Path, output: &Path) -> Config {
    let mut config = Config::default_config();
    config.input.paths = vec![input.to_path_buf()];
    config.enrichment.enabled = false;
    config.output.path = output.to_path_buf();
    config
}

fn write_inputs(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    fs::write(
        dir.join("a.csv"),
        "8.8.8.8,jos@ir.nl\n\"8.8.8.8,\"\n192.168.1.1\n",
    )
    .unwrap();
    fs::write(
        dir.join("notes.txt"),
        "visit https://malicious.example.org and d41d8cd98f00b204e9800998ecf8427e\n",
    )
    .unwrap();
}

#[tokio::test]
async fn test_offline_run_writes_report() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in");
    let output = temp.path().join("out").join("results.csv");
    write_inputs(&input);

    let outcome = PipelineOrchestrator::new(config_for(&input, &output))
        .unwrap()
        .with_progress(false)
        .run()
        .await
        .unwrap();

    let summary: Vec<(&str, u64, IndicatorKind)> = outcome
        .records
        .iter()
        .map(|r| (r.value.as_str(), r.count, r.kind))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("8.8.8.8", 2, IndicatorKind::IpAddress),
            ("jos@ir.nl", 1, IndicatorKind::Email),
            ("https://malicious.example.org", 1, IndicatorKind::Url),
            ("d41d8cd98f00b204e9800998ecf8427e", 1, IndicatorKind::Md5),
        ]
    );
    assert_eq!(outcome.stats.sources_read, 2);
    assert_eq!(outcome.stats.lookups, 0);
    assert!(outcome.enriched_files.is_empty());

    let report = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(
        lines[0],
        "Regex result,Count,Type,Found in file(s),City,Country,Organization,Full,Error"
    );
    let a_csv = input.join("a.csv").display().to_string();
    assert_eq!(lines[1], format!("8.8.8.8,2,ip_address,{},,,,,", a_csv));
}

#[tokio::test]
async fn test_no_indicators_is_empty_result() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join("lan.csv"), "10.0.0.1,127.0.0.1\nhello world\n").unwrap();
    let output = temp.path().join("results.csv");

    let err = PipelineOrchestrator::new(config_for(&input, &output))
        .unwrap()
        .with_progress(false)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::EmptyResult));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_enrichment_and_reenrichment_use_one_lookup_per_ip() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in");
    fs::create_dir_all(&input).unwrap();
    fs::write(
        input.join("hosts.csv"),
        "resolver,8.8.8.8\nlan,10.1.1.1\nmail,jos@ir.nl\n",
    )
    .unwrap();
    let output = temp.path().join("results.csv");

    let mut config = config_for(&input, &output);
    config.enrichment.enabled = true;
    config.enrichment.parallel_workers = 2;
    config.output.enrich_existing = true;

    let backend = Arc::new(FakeIpInfo::default());
    let client = EnrichmentClient::new(backend.clone(), Duration::ZERO);

    let outcome = PipelineOrchestrator::new(config)
        .unwrap()
        .with_enrichment_client(client)
        .with_progress(false)
        .run()
        .await
        .unwrap();

    // the probe address is 8.8.8.8, every later request is served from the cache
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    assert_eq!(outcome.stats.lookups, 1);

    let ip = &outcome.records[0];
    assert_eq!(ip.city, "Mountain View");
    assert_eq!(ip.full, r#"{"country":"US","ip":"8.8.8.8"}"#);
    assert_eq!(outcome.records[1].full, "");

    let enriched = input.join("hosts.csv_enriched.csv");
    assert_eq!(outcome.enriched_files, vec![enriched.clone()]);
    let content = fs::read_to_string(&enriched).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            r#""resolver","8.8.8.8","{""country"":""US"",""ip"":""8.8.8.8""}""#,
            r#""lan","10.1.1.1","""#,
            r#""mail","jos@ir.nl","""#,
        ]
    );
}

#[test]
fn test_repeated_runs_are_identical() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in");
    write_inputs(&input);

    let run = |name: &str| {
        let output = temp.path().join(name);
        let orchestrator = PipelineOrchestrator::new(config_for(&input, &output))
            .unwrap()
            .with_progress(false);
        tokio_test::block_on(orchestrator.run()).unwrap();
        fs::read_to_string(output).unwrap()
    };

    assert_eq!(run("first.csv"), run("second.csv"));
}

#[tokio::test]
async fn test_custom_pattern_only() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("cases.txt");
    fs::write(&input, "CASE-1234 relates to 8.8.8.8; see CASE-1234 and CASE-99\n").unwrap();
    let output = temp.path().join("results.csv");

    let mut config = config_for(&input, &output);
    config.extraction.search = vec!["custom".to_string()];
    config.extraction.custom_pattern = "CASE-[0-9]{4}".to_string();

    let outcome = PipelineOrchestrator::new(config)
        .unwrap()
        .with_progress(false)
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].value, "CASE-1234");
    assert_eq!(outcome.records[0].count, 2);
    assert_eq!(outcome.records[0].kind, IndicatorKind::Custom);
}
