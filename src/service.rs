//! Cache-backed publication service.
//!
//! Ties the aggregator to the cache store. Aggregations are serialized with
//! an async mutex: a second refresh waits for the running one to finish and
//! then performs its own.

use tokio::sync::Mutex;

use crate::config::Config;
use crate::pipeline::{AggregateError, Aggregator};
use crate::sources::{SourceError, SourceRegistry};
use crate::utils::{CacheEntry, CacheResult, CacheStatus, CacheStore, ProgressReporter};

/// Publication service shared by the HTTP handlers and the CLI
#[derive(Debug)]
pub struct PublicationService {
    author_id: String,
    aggregator: Aggregator,
    cache: CacheStore,
    refresh_lock: Mutex<()>,
}

impl PublicationService {
    pub fn new(author_id: impl Into<String>, aggregator: Aggregator, cache: CacheStore) -> Self {
        Self {
            author_id: author_id.into(),
            aggregator,
            cache,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Build the production service from configuration
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let registry = SourceRegistry::from_config(config)?;
        Ok(Self::new(
            config.author.id.clone(),
            Aggregator::from_registry(&registry, config.http.lookup_timeout()),
            CacheStore::from_config(&config.cache),
        ))
    }

    pub fn author_id(&self) -> &str {
        &self.author_id
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Current cache contents, classified by freshness
    pub fn cached(&self) -> CacheResult {
        self.cache.load()
    }

    pub fn status(&self) -> CacheStatus {
        self.cache.status()
    }

    pub fn cache_exists(&self) -> bool {
        self.cache.exists()
    }

    /// Run a full aggregation and cache the result
    ///
    /// On failure the existing cache is left untouched and an error event
    /// is sent to the reporter. On success the `done` event carries the new
    /// data.
    pub async fn refresh(
        &self,
        progress: &mut ProgressReporter,
    ) -> Result<CacheEntry, AggregateError> {
        let _guard = self.refresh_lock.lock().await;
        tracing::info!("Refreshing publications for {}", self.author_id);

        match self.aggregator.aggregate(&self.author_id, progress).await {
            Ok(result) => {
                let entry = self.cache.save(result);
                progress.finish(&entry.data).await;
                Ok(entry)
            }
            Err(e) => {
                tracing::error!("Aggregation failed: {}", e);
                progress.fail(&e.to_string()).await;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawProfile;
    use crate::pipeline::AbstractResolver;
    use crate::sources::mock::make_stub;
    use crate::sources::MockProfileSource;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn service(dir: &TempDir, source: MockProfileSource) -> PublicationService {
        PublicationService::new(
            "abc",
            Aggregator::new(
                Arc::new(source),
                AbstractResolver::new(vec![], vec![], Duration::from_secs(1)),
            ),
            CacheStore::new(dir.path().join("cache.json"), Duration::from_secs(3600)),
        )
    }

    fn profile() -> RawProfile {
        RawProfile {
            name: "Jane Doe".to_string(),
            publications: vec![make_stub("One", 1), make_stub("Two", 2)],
            ..RawProfile::default()
        }
    }

    #[tokio::test]
    async fn test_refresh_writes_cache() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, MockProfileSource::new(profile()));
        assert!(!service.status().has_cache);

        let entry = service.refresh(&mut ProgressReporter::quiet()).await.unwrap();
        assert_eq!(entry.data.publications.len(), 2);

        match service.cached() {
            CacheResult::Hit(cached) => assert_eq!(cached, entry),
            other => panic!("Expected cache hit, got {:?}", other),
        }
        assert!(service.status().is_fresh);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_cache() {
        let dir = TempDir::new().unwrap();
        let good = service(&dir, MockProfileSource::new(profile()));
        let before = good.refresh(&mut ProgressReporter::quiet()).await.unwrap();

        let broken = service(&dir, MockProfileSource::unavailable());
        let (mut reporter, mut rx) = ProgressReporter::channel(4);
        assert!(broken.refresh(&mut reporter).await.is_err());

        let event = rx.recv().await.unwrap();
        assert!(event.is_terminal());
        assert_eq!(broken.cached().entry(), Some(before));
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_are_serialized() {
        let dir = TempDir::new().unwrap();
        let service = Arc::new(service(&dir, MockProfileSource::new(profile())));

        let first = tokio::spawn({
            let service = service.clone();
            async move { service.refresh(&mut ProgressReporter::quiet()).await }
        });
        let second = tokio::spawn({
            let service = service.clone();
            async move { service.refresh(&mut ProgressReporter::quiet()).await }
        });

        let first = first.await.unwrap().unwrap();
        let second = second.await.unwrap().unwrap();
        assert_eq!(first.data, second.data);

        let cached = service.cached().entry().unwrap();
        assert!(cached == first || cached == second);
    }
}
