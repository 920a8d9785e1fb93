//! Abstract resolution across the fallback chain.

use std::sync::Arc;
use std::time::Duration;

use crate::sources::{AbstractSource, SourceError, SourceRegistry};
use crate::utils::sanitize;

/// Length (in characters, after sanitizing) at which a profile abstract is
/// taken to be complete. Shorter ones are usually truncated by the profile
/// page.
pub const MIN_COMPLETE_ABSTRACT_LEN: usize = 1000;

/// Picks the best abstract for a publication
///
/// Order of preference:
///
/// 1. the profile's own abstract, if it looks complete;
/// 2. the first abstract from the secondary sources;
/// 3. when the profile had no abstract at all, the first abstract from the
///    tertiary sources;
/// 4. the profile's (short) abstract.
///
/// Every source is asked at most once and each call is bounded by the lookup
/// timeout. Failures are logged and treated as "nothing found".
#[derive(Debug, Clone)]
pub struct AbstractResolver {
    secondary: Vec<Arc<dyn AbstractSource>>,
    tertiary: Vec<Arc<dyn AbstractSource>>,
    lookup_timeout: Duration,
}

impl AbstractResolver {
    pub fn new(
        secondary: Vec<Arc<dyn AbstractSource>>,
        tertiary: Vec<Arc<dyn AbstractSource>>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            secondary,
            tertiary,
            lookup_timeout,
        }
    }

    pub fn from_registry(registry: &SourceRegistry, lookup_timeout: Duration) -> Self {
        Self::new(
            registry.secondary().to_vec(),
            registry.tertiary().to_vec(),
            lookup_timeout,
        )
    }

    /// Resolve the abstract for `title`, given the profile's own abstract
    pub async fn resolve(
        &self,
        title: &str,
        authors: &[String],
        existing: Option<&str>,
    ) -> Option<String> {
        let existing = sanitize(existing).filter(|text| !text.is_empty());

        if let Some(text) = &existing {
            let len = text.chars().count();
            if len >= MIN_COMPLETE_ABSTRACT_LEN {
                tracing::debug!("Using profile abstract for {} ({} chars)", title, len);
                return existing;
            }
        }

        if let Some(found) = self.first_match(&self.secondary, title, authors).await {
            return Some(found);
        }

        if existing.is_none() {
            if let Some(found) = self.first_match(&self.tertiary, title, authors).await {
                return Some(found);
            }
        }

        if existing.is_none() {
            tracing::debug!("No abstract found for {}", title);
        }
        existing
    }

    async fn first_match(
        &self,
        sources: &[Arc<dyn AbstractSource>],
        title: &str,
        authors: &[String],
    ) -> Option<String> {
        for source in sources {
            if let Some(found) = self.query(source.as_ref(), title, authors).await {
                return Some(found);
            }
        }
        None
    }

    async fn query(
        &self,
        source: &dyn AbstractSource,
        title: &str,
        authors: &[String],
    ) -> Option<String> {
        let outcome = tokio::time::timeout(self.lookup_timeout, source.lookup_abstract(title, authors))
            .await
            .unwrap_or_else(|_| Err(SourceError::Timeout(self.lookup_timeout)));

        match outcome {
            Ok(Some(raw)) => {
                let text = sanitize(Some(&raw)).filter(|text| !text.is_empty());
                match &text {
                    Some(text) => tracing::debug!(
                        "Abstract for {} from {} ({} chars)",
                        title,
                        source.name(),
                        text.chars().count()
                    ),
                    None => tracing::debug!("{} returned an empty abstract for {}", source.name(), title),
                }
                text
            }
            Ok(None) => {
                tracing::debug!("{} has no abstract for {}", source.name(), title);
                None
            }
            Err(e) => {
                tracing::warn!("{} lookup failed for {}: {}", source.name(), title, e);
                None
            }
        }
    }
}
