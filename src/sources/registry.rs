//! Registry wiring the configured sources into fallback tiers.

use std::sync::Arc;

use super::{
    crossref::CrossRefSource, google_scholar::GoogleScholarSource, pubmed::PubMedSource,
    semantic::SemanticScholarSource, AbstractSource, ProfileSource, SourceError,
};
use crate::config::Config;

/// The sources used by one aggregation
///
/// Abstract sources are split into two ordered tiers. The secondary tier is
/// tried when the profile's own abstract is missing or short; the tertiary
/// tier only when the profile had no abstract at all.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    profile: Arc<dyn ProfileSource>,
    secondary: Vec<Arc<dyn AbstractSource>>,
    tertiary: Vec<Arc<dyn AbstractSource>>,
}

impl SourceRegistry {
    /// Create a registry with explicit sources
    pub fn new(
        profile: Arc<dyn ProfileSource>,
        secondary: Vec<Arc<dyn AbstractSource>>,
        tertiary: Vec<Arc<dyn AbstractSource>>,
    ) -> Self {
        Self {
            profile,
            secondary,
            tertiary,
        }
    }

    /// Create the production registry from configuration
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let profile: Arc<dyn ProfileSource> = Arc::new(GoogleScholarSource::new(&config.http)?);

        let secondary: Vec<Arc<dyn AbstractSource>> =
            vec![Arc::new(CrossRefSource::new(&config.http, &config.sources)?)];

        let mut tertiary: Vec<Arc<dyn AbstractSource>> = vec![Arc::new(
            SemanticScholarSource::new(&config.http, &config.sources)?,
        )];
        if config.sources.pubmed_enabled {
            tertiary.push(Arc::new(PubMedSource::new(&config.http)?));
        }

        let registry = Self::new(profile, secondary, tertiary);
        tracing::debug!(
            "Registered sources: profile={}, secondary=[{}], tertiary=[{}]",
            registry.profile.id(),
            registry.secondary_ids().join(", "),
            registry.tertiary_ids().join(", ")
        );
        Ok(registry)
    }

    /// The profile source
    pub fn profile(&self) -> &Arc<dyn ProfileSource> {
        &self.profile
    }

    /// Abstract sources consulted when the profile abstract is missing or short
    pub fn secondary(&self) -> &[Arc<dyn AbstractSource>] {
        &self.secondary
    }

    /// Abstract sources consulted when the profile had no abstract
    pub fn tertiary(&self) -> &[Arc<dyn AbstractSource>] {
        &self.tertiary
    }

    pub fn secondary_ids(&self) -> Vec<&str> {
        self.secondary.iter().map(|s| s.id()).collect()
    }

    pub fn tertiary_ids(&self) -> Vec<&str> {
        self.tertiary.iter().map(|s| s.id()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tiers() {
        let registry = SourceRegistry::from_config(&Config::default()).unwrap();
        assert_eq!(registry.profile().id(), "google_scholar");
        assert_eq!(registry.secondary_ids(), vec!["crossref"]);
        assert_eq!(registry.tertiary_ids(), vec!["semantic"]);
    }

    #[test]
    fn test_pubmed_joins_tertiary_tier() {
        let mut config = Config::default();
        config.sources.pubmed_enabled = true;

        let registry = SourceRegistry::from_config(&config).unwrap();
        assert_eq!(registry.tertiary_ids(), vec!["semantic", "pubmed"]);
    }
}
