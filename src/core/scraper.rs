use crate::core::{CincinnatiPayload, ConfigProvider, Release, ReleaseSource, Result};
use crate::utils::error::FakeupError;
use crate::utils::metrics::Metrics;
use futures_util::future::try_join_all;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Release scraper.
///
/// Keeps the latest release of every configured stream in memory and
/// refreshes it from a [`ReleaseSource`] in the background.
#[derive(Clone)]
pub struct Scraper {
    source: Arc<dyn ReleaseSource>,
    streams: BTreeSet<String>,
    refresh_pause: Duration,
    latest: Arc<RwLock<HashMap<String, Release>>>,
    metrics: Metrics,
}

impl Scraper {
    pub fn new(
        source: Arc<dyn ReleaseSource>,
        streams: BTreeSet<String>,
        refresh_pause: Duration,
        metrics: Metrics,
    ) -> Self {
        Self {
            source,
            streams,
            refresh_pause,
            latest: Arc::new(RwLock::new(HashMap::new())),
            metrics,
        }
    }

    pub fn from_config<C: ConfigProvider>(
        source: Arc<dyn ReleaseSource>,
        config: &C,
        metrics: Metrics,
    ) -> Self {
        let streams = config.streams().iter().cloned().collect();
        Self::new(source, streams, config.refresh_pause(), metrics)
    }

    /// Fetch the latest release of every stream.
    ///
    /// Fails as a whole if any stream fails; streams without releases are
    /// left out of the result.
    async fn fetch_all(&self) -> Result<HashMap<String, Release>> {
        let fetches = self.streams.iter().map(|stream| async move {
            let latest = self.source.latest_release(stream).await?;
            Ok::<_, FakeupError>((stream.clone(), latest))
        });

        let results = try_join_all(fetches).await?;
        let streams_latest = results
            .into_iter()
            .filter_map(|(stream, latest)| latest.map(|release| (stream, release)))
            .collect();
        Ok(streams_latest)
    }

    /// Run one refresh. On failure the previous cache is kept.
    pub async fn refresh(&self) -> Result<()> {
        self.metrics.upstream_scrapes.inc();

        let cache = self.fetch_all().await?;
        tracing::debug!(
            "Refreshed {} of {} stream(s)",
            cache.len(),
            self.streams.len()
        );

        *self.latest.write().await = cache;
        self.metrics
            .last_refresh
            .set(chrono::Utc::now().timestamp());
        Ok(())
    }

    /// Refresh forever, pausing between the end of one refresh and the start of the next.
    pub async fn run(self) {
        tracing::info!(
            "Scraping {} stream(s) every {:?}",
            self.streams.len(),
            self.refresh_pause
        );
        loop {
            if let Err(e) = self.refresh().await {
                tracing::error!("Release refresh failed: {}", e);
            }
            tokio::time::sleep(self.refresh_pause).await;
        }
    }

    /// Start the refresh loop on the runtime.
    pub fn spawn(&self) -> JoinHandle<()> {
        tokio::spawn(self.clone().run())
    }

    /// Graph node for the latest release of `stream` built for `basearch`.
    pub async fn get_latest(&self, basearch: &str, stream: &str) -> Result<CincinnatiPayload> {
        let latest = self.latest.read().await;
        let release = latest
            .get(stream)
            .ok_or_else(|| FakeupError::StreamUnavailable {
                stream: stream.to_string(),
            })?;

        let checksum =
            release
                .checksum_for(basearch)
                .ok_or_else(|| FakeupError::BasearchUnavailable {
                    basearch: basearch.to_string(),
                })?;

        Ok(CincinnatiPayload::checksum_node(
            release.version.clone(),
            checksum.to_string(),
            1,
        ))
    }

    /// Streams currently holding a cached release.
    pub async fn cached_streams(&self) -> Vec<String> {
        let mut streams: Vec<String> = self.latest.read().await.keys().cloned().collect();
        streams.sort();
        streams
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

impl std::fmt::Debug for Scraper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scraper")
            .field("streams", &self.streams)
            .field("refresh_pause", &self.refresh_pause)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ReleaseCommit, AGE_INDEX_KEY, SCHEME_KEY};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    /// In-memory source whose answers can be changed between refreshes.
    struct MockSource {
        releases: Mutex<HashMap<String, Release>>,
        fail: AtomicBool,
        failing_streams: Mutex<HashSet<String>>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl MockSource {
        fn new() -> Self {
            Self::with_delay(Duration::ZERO)
        }

        /// Source that takes `delay` to answer each fetch.
        fn with_delay(delay: Duration) -> Self {
            Self {
                releases: Mutex::new(HashMap::new()),
                fail: AtomicBool::new(false),
                failing_streams: Mutex::new(HashSet::new()),
                delay,
                calls: AtomicUsize::new(0),
            }
        }

        async fn fail_stream(&self, stream: &str) {
            self.failing_streams.lock().await.insert(stream.to_string());
        }

        async fn publish(&self, stream: &str, release: Release) {
            self.releases
                .lock()
                .await
                .insert(stream.to_string(), release);
        }
    }

    #[async_trait]
    impl ReleaseSource for MockSource {
        async fn latest_release(&self, stream: &str) -> Result<Option<Release>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail.load(Ordering::SeqCst)
                || self.failing_streams.lock().await.contains(stream)
            {
                return Err(FakeupError::ConfigError {
                    message: "upstream down".to_string(),
                });
            }
            Ok(self.releases.lock().await.get(stream).cloned())
        }
    }

    fn release(version: &str, commits: &[(&str, &str)]) -> Release {
        Release {
            version: version.to_string(),
            commits: commits
                .iter()
                .map(|(arch, sum)| ReleaseCommit {
                    architecture: arch.to_string(),
                    checksum: sum.to_string(),
                })
                .collect(),
            metadata: None,
        }
    }

    fn scraper(source: Arc<MockSource>, streams: &[&str]) -> Scraper {
        Scraper::new(
            source,
            streams.iter().map(|s| s.to_string()).collect(),
            Duration::from_secs(30),
            Metrics::new().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_get_latest_before_refresh_is_unavailable() {
        let scraper = scraper(Arc::new(MockSource::new()), &["testing"]);

        let err = scraper.get_latest("x86_64", "testing").await.unwrap_err();
        assert!(matches!(err, FakeupError::StreamUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_refresh_populates_cache() {
        let source = Arc::new(MockSource::new());
        source
            .publish("testing", release("30.2", &[("x86_64", "abc"), ("aarch64", "def")]))
            .await;
        let scraper = scraper(source.clone(), &["testing", "next"]);

        scraper.refresh().await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(scraper.cached_streams().await, vec!["testing".to_string()]);
        assert_eq!(scraper.metrics().upstream_scrapes.get(), 1);
        assert!(scraper.metrics().last_refresh.get() > 0);

        let node = scraper.get_latest("aarch64", "testing").await.unwrap();
        assert_eq!(node.version, "30.2");
        assert_eq!(node.payload, "def");
        assert_eq!(node.metadata[SCHEME_KEY], "checksum");
        assert_eq!(node.metadata[AGE_INDEX_KEY], "1");
    }

    #[tokio::test]
    async fn test_missing_basearch() {
        let source = Arc::new(MockSource::new());
        source.publish("testing", release("30.2", &[("x86_64", "abc")])).await;
        let scraper = scraper(source, &["testing"]);
        scraper.refresh().await.unwrap();

        let err = scraper.get_latest("s390x", "testing").await.unwrap_err();
        assert!(matches!(err, FakeupError::BasearchUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_cache() {
        let source = Arc::new(MockSource::new());
        source.publish("testing", release("30.2", &[("x86_64", "abc")])).await;
        let scraper = scraper(source.clone(), &["testing"]);
        scraper.refresh().await.unwrap();
        let stamp = scraper.metrics().last_refresh.get();

        source.fail.store(true, Ordering::SeqCst);
        assert!(scraper.refresh().await.is_err());

        assert_eq!(scraper.metrics().upstream_scrapes.get(), 2);
        assert_eq!(scraper.metrics().last_refresh.get(), stamp);
        let node = scraper.get_latest("x86_64", "testing").await.unwrap();
        assert_eq!(node.payload, "abc");
    }

    #[tokio::test]
    async fn test_successful_refresh_replaces_cache() {
        let source = Arc::new(MockSource::new());
        source.publish("testing", release("30.2", &[("x86_64", "abc")])).await;
        let scraper = scraper(source.clone(), &["testing"]);
        scraper.refresh().await.unwrap();

        source.releases.lock().await.clear();
        scraper.refresh().await.unwrap();

        assert!(scraper.cached_streams().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_refreshes_immediately_then_after_pause() {
        let source = Arc::new(MockSource::new());
        let scraper = scraper(source.clone(), &["testing"]);
        let handle = scraper.spawn();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        handle.abort();
    }

    #[tokio::test]
    async fn test_one_failing_stream_fails_whole_refresh() {
        let source = Arc::new(MockSource::new());
        source.publish("a", release("30.2", &[("x86_64", "abc")])).await;
        source.publish("b", release("30.3", &[("x86_64", "def")])).await;
        source.fail_stream("b").await;
        let scraper = scraper(source.clone(), &["a", "b"]);

        assert!(scraper.refresh().await.is_err());

        assert!(scraper.cached_streams().await.is_empty());
        assert_eq!(scraper.metrics().last_refresh.get(), 0);
        let err = scraper.get_latest("x86_64", "a").await.unwrap_err();
        assert!(matches!(err, FakeupError::StreamUnavailable { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_starts_after_slow_refresh_finishes() {
        let source = Arc::new(MockSource::with_delay(Duration::from_secs(10)));
        source.publish("testing", release("30.2", &[("x86_64", "abc")])).await;
        let scraper = scraper(source.clone(), &["testing"]);
        let handle = scraper.spawn();

        // First refresh runs 0s..10s, the next one starts at 40s.
        tokio::time::sleep(Duration::from_secs(35)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(scraper.cached_streams().await, vec!["testing".to_string()]);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_after_failed_refresh() {
        let source = Arc::new(MockSource::with_delay(Duration::from_secs(10)));
        source.fail.store(true, Ordering::SeqCst);
        let scraper = scraper(source.clone(), &["testing"]);
        let handle = scraper.spawn();

        tokio::time::sleep(Duration::from_secs(35)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(scraper.metrics().upstream_scrapes.get(), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(scraper.metrics().upstream_scrapes.get(), 2);
        assert!(scraper.cached_streams().await.is_empty());

        handle.abort();
    }
}
