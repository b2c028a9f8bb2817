// file: src/enrichment/client.rs
// description: caching, rate-limited enrichment client over a lookup backend
// reference: https://docs.rs/tokio/latest/tokio/sync/struct.OnceCell.html

use crate::config::EnrichmentConfig;
use crate::enrichment::backend::{IpInfoBackend, LookupBackend, read_token};
use crate::error::{PipelineError, Result};
use crate::models::EnrichmentResult;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

type CacheSlot = Arc<OnceCell<EnrichmentResult>>;

pub struct EnrichmentClient {
    backend: Arc<dyn LookupBackend>,
    delay: Duration,
    cache: Mutex<HashMap<String, CacheSlot>>,
    pacer: Mutex<()>,
    lookups: AtomicUsize,
    failures: AtomicUsize,
}

impl EnrichmentClient {
    pub fn new(backend: Arc<dyn LookupBackend>, delay: Duration) -> Self {
        Self {
            backend,
            delay,
            cache: Mutex::new(HashMap::new()),
            pacer: Mutex::new(()),
            lookups: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
        }
    }

    /// Builds an ipinfo-backed client. A missing or empty token file is a configuration error.
    pub fn from_config(config: &EnrichmentConfig) -> Result<Self> {
        let token = read_token(&config.token_path)?;
        info!(
            "Access token read from {}",
            config.token_path.display()
        );

        let backend = IpInfoBackend::new(&config.base_url, token, config.timeout())?;
        Ok(Self::new(Arc::new(backend), config.delay()))
    }

    /// Liveness check before any source is read. The answer is cached like any other lookup.
    pub async fn probe(&self, probe_ip: &str) -> Result<()> {
        info!(
            "Testing the {} lookup service with {}",
            self.backend.name(),
            probe_ip
        );

        let result = self.enrich(probe_ip).await;
        if result.is_success() {
            info!("Lookup service probe successful");
            Ok(())
        } else {
            Err(PipelineError::Config(format!(
                "Lookup service probe with {} failed: {}. Use --skip-enrich to run without enrichment",
                probe_ip, result.error
            )))
        }
    }

    /// Returns the enrichment for `ip`, querying the backend at most once per run.
    pub async fn enrich(&self, ip: &str) -> EnrichmentResult {
        let slot = {
            let mut cache = self.cache.lock().await;
            cache.entry(ip.to_string()).or_default().clone()
        };

        if let Some(result) = slot.get() {
            debug!("Cache hit for {}", ip);
            return result.clone();
        }

        slot.get_or_init(|| self.query(ip)).await.clone()
    }

    /// Cached result for `ip`, never triggers a query.
    pub async fn cached(&self, ip: &str) -> Option<EnrichmentResult> {
        let cache = self.cache.lock().await;
        cache.get(ip).and_then(|slot| slot.get().cloned())
    }

    pub fn lookups_performed(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn lookups_failed(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }

    async fn query(&self, ip: &str) -> EnrichmentResult {
        info!("Querying {} for {}", self.backend.name(), ip);
        self.lookups.fetch_add(1, Ordering::SeqCst);

        let result = match self.backend.lookup(ip).await {
            Ok(details) => EnrichmentResult::from_details(details),
            Err(e) => {
                warn!("Lookup of {} resulted in an error: {}", ip, e);
                self.failures.fetch_add(1, Ordering::SeqCst);
                EnrichmentResult::degraded(e)
            }
        };

        self.pace().await;
        result
    }

    /// Sleeps the configured delay. Delays of concurrent lookups are served one after another.
    async fn pace(&self) {
        if self.delay.is_zero() {
            return;
        }
        let _turn = self.pacer.lock().await;
        tokio::time::sleep(self.delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IpDetails;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::time::Instant;

    #[derive(Default)]
    struct FakeBackend {
        calls: AtomicUsize,
        latency: Duration,
    }

    #[async_trait]
    impl LookupBackend for FakeBackend {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn lookup(&self, ip: &str) -> Result<IpDetails> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }

            if ip.starts_with("6.6.6.") {
                return Err(PipelineError::EnrichmentLookup {
                    ip: ip.to_string(),
                    message: "quota exhausted".to_string(),
                });
            }

            let mut attributes = BTreeMap::new();
            attributes.insert("ip".to_string(), ip.to_string());
            attributes.insert("org".to_string(), "AS1 \"Quoted\" Org".to_string());

            Ok(IpDetails {
                city: Some("Amsterdam".to_string()),
                country: Some("NL".to_string()),
                organization: Some("AS1 \"Quoted\" Org".to_string()),
                attributes,
            })
        }
    }

    fn client_with(backend: Arc<FakeBackend>, delay: Duration) -> EnrichmentClient {
        EnrichmentClient::new(backend, delay)
    }

    #[tokio::test]
    async fn test_second_request_hits_cache() {
        let backend = Arc::new(FakeBackend::default());
        let client = client_with(backend.clone(), Duration::ZERO);

        let first = client.enrich("8.8.8.8").await;
        let second = client.enrich("8.8.8.8").await;

        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.lookups_performed(), 1);
        assert_eq!(first, second);
        assert_eq!(first.organization, "AS1 Quoted Org");
        assert_eq!(first.attributes["org"], "AS1 Quoted Org");
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_lookup() {
        let backend = Arc::new(FakeBackend {
            latency: Duration::from_millis(30),
            ..FakeBackend::default()
        });
        let client = client_with(backend.clone(), Duration::ZERO);

        let (a, b, c) = tokio::join!(
            client.enrich("9.9.9.9"),
            client.enrich("9.9.9.9"),
            client.enrich("9.9.9.9")
        );

        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[tokio::test]
    async fn test_failure_is_degraded_and_cached() {
        let backend = Arc::new(FakeBackend::default());
        let client = client_with(backend.clone(), Duration::ZERO);

        let result = client.enrich("6.6.6.6").await;
        assert!(!result.is_success());
        assert!(result.error.contains("quota exhausted"));
        assert!(result.city.is_empty());
        assert!(result.attributes.is_empty());

        client.enrich("6.6.6.6").await;
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.lookups_failed(), 1);
    }

    #[tokio::test]
    async fn test_cached_never_queries() {
        let backend = Arc::new(FakeBackend::default());
        let client = client_with(backend.clone(), Duration::ZERO);

        assert!(client.cached("1.1.1.1").await.is_none());
        client.enrich("1.1.1.1").await;
        assert!(client.cached("1.1.1.1").await.is_some());
        assert!(client.cached("1.0.0.1").await.is_none());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_delay_applies_per_lookup_regardless_of_workers() {
        let backend = Arc::new(FakeBackend::default());
        let delay = Duration::from_millis(40);
        let client = client_with(backend.clone(), delay);

        let start = Instant::now();
        let (a, b, c) = tokio::join!(
            client.enrich("1.1.1.1"),
            client.enrich("8.8.8.8"),
            client.enrich("9.9.9.9")
        );

        assert!(a.is_success() && b.is_success() && c.is_success());
        assert!(start.elapsed() >= delay * 3);

        let start = Instant::now();
        client.enrich("8.8.8.8").await;
        assert!(start.elapsed() < delay);
    }

    #[tokio::test]
    async fn test_startup_lookup_cached_and_fatal_on_failure() {
        let backend = Arc::new(FakeBackend::default());
        let client = client_with(backend.clone(), Duration::ZERO);

        assert!(client.probe("8.8.8.8").await.is_ok());
        client.enrich("8.8.8.8").await;
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);

        let err = client.probe("6.6.6.1").await.unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
