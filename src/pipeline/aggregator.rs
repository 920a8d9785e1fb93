//! Publication aggregation for one author.

use std::sync::Arc;
use std::time::Duration;

use super::{AbstractResolver, AggregateError};
use crate::models::{AggregationResult, AuthorRecord, Publication, RawPublication};
use crate::sources::{ProfileSource, SourceError, SourceRegistry};
use crate::utils::ProgressReporter;

/// Builds an [`AggregationResult`] from a profile source
///
/// Publications are processed one at a time in profile order. A publication
/// that cannot be filled or has no title is logged and left out; only a
/// failed profile fetch aborts the run.
#[derive(Debug, Clone)]
pub struct Aggregator {
    profile: Arc<dyn ProfileSource>,
    resolver: AbstractResolver,
}

impl Aggregator {
    pub fn new(profile: Arc<dyn ProfileSource>, resolver: AbstractResolver) -> Self {
        Self { profile, resolver }
    }

    pub fn from_registry(registry: &SourceRegistry, lookup_timeout: Duration) -> Self {
        Self::new(
            registry.profile().clone(),
            AbstractResolver::from_registry(registry, lookup_timeout),
        )
    }

    /// Aggregate all publications of `author_id`
    pub async fn aggregate(
        &self,
        author_id: &str,
        progress: &mut ProgressReporter,
    ) -> Result<AggregationResult, AggregateError> {
        tracing::info!("Fetching profile {} from {}", author_id, self.profile.id());

        let profile = self
            .profile
            .fetch_profile(author_id)
            .await
            .map_err(|source| AggregateError::Profile {
                author_id: author_id.to_string(),
                source,
            })?;

        let total = profile.publications.len();
        progress.begin(total).await;

        let mut publications = Vec::with_capacity(total);
        for stub in &profile.publications {
            match self.build_publication(stub).await {
                Ok(publication) => {
                    progress.advance(&publication.title).await;
                    publications.push(publication);
                }
                Err(e) => {
                    tracing::warn!("Skipping publication {}: {}", stub.label(), e);
                    progress.advance(stub.label()).await;
                }
            }
        }

        let author = AuthorRecord {
            name: profile.name,
            citations: profile.citations,
            h_index: profile.h_index,
            i10_index: profile.i10_index,
        };
        let result = AggregationResult::new(author, publications);

        tracing::info!(
            "Aggregated {}/{} publications ({} with abstracts)",
            result.publications.len(),
            total,
            result.abstract_count()
        );
        Ok(result)
    }

    async fn build_publication(&self, stub: &RawPublication) -> Result<Publication, SourceError> {
        let filled = self.profile.fill_publication(stub).await?;

        let title = filled
            .title()
            .ok_or_else(|| SourceError::Parse("publication has no title".to_string()))?;

        let abstract_text = self
            .resolver
            .resolve(title, &filled.authors, filled.r#abstract.as_deref())
            .await;

        Ok(Publication::builder(title)
            .authors(filled.authors.clone())
            .venue(filled.venue())
            .year(filled.year())
            .citations(filled.num_citations.unwrap_or(0))
            .url(filled.pub_url.clone())
            .abstract_text(abstract_text)
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawProfile, StreamEvent};
    use crate::sources::mock::make_stub;
    use crate::sources::{AbstractSource, MockAbstractSource, MockProfileSource};

    fn profile(stubs: Vec<RawPublication>) -> RawProfile {
        RawProfile {
            name: "Jane Doe".to_string(),
            citations: 63,
            h_index: 3,
            i10_index: 1,
            publications: stubs,
        }
    }

    fn aggregator(source: MockProfileSource, secondary: MockAbstractSource) -> Aggregator {
        let secondary: Arc<dyn AbstractSource> = Arc::new(secondary);
        Aggregator::new(
            Arc::new(source),
            AbstractResolver::new(vec![secondary], vec![], Duration::from_secs(5)),
        )
    }

    #[tokio::test]
    async fn test_sorted_by_citations() {
        let source = MockProfileSource::new(profile(vec![
            make_stub("Three", 3),
            make_stub("Fifty", 50),
            make_stub("Ten", 10),
        ]));

        let result = aggregator(source, MockAbstractSource::new("crossref"))
            .aggregate("abc", &mut ProgressReporter::quiet())
            .await
            .unwrap();

        let citations: Vec<u64> = result.publications.iter().map(|p| p.citations).collect();
        assert_eq!(citations, vec![50, 10, 3]);
        assert_eq!(result.author.name, "Jane Doe");
        assert_eq!(result.author.h_index, 3);
    }

    #[tokio::test]
    async fn test_failed_publications_are_skipped() {
        let untitled = RawPublication {
            title: Some("   ".to_string()),
            ..RawPublication::default()
        };
        let source = MockProfileSource::new(profile(vec![
            make_stub("Good", 1),
            make_stub("Broken", 2),
            untitled,
        ]));
        source.fail_fill("Broken");

        let (mut reporter, mut rx) = ProgressReporter::channel(16);
        let result = aggregator(source, MockAbstractSource::new("crossref"))
            .aggregate("abc", &mut reporter)
            .await
            .unwrap();
        drop(reporter);

        assert_eq!(result.publications.len(), 1);
        assert_eq!(result.publications[0].title, "Good");

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                StreamEvent::progress(0, 3, "Starting..."),
                StreamEvent::progress(1, 3, "Good"),
                StreamEvent::progress(2, 3, "Broken"),
                StreamEvent::progress(3, 3, "Untitled publication"),
            ]
        );
    }

    #[tokio::test]
    async fn test_profile_failure_aborts() {
        let result = aggregator(MockProfileSource::unavailable(), MockAbstractSource::new("crossref"))
            .aggregate("missing", &mut ProgressReporter::quiet())
            .await;

        match result {
            Err(AggregateError::Profile { author_id, .. }) => assert_eq!(author_id, "missing"),
            other => panic!("Expected profile error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fields_and_abstract() {
        let stub = RawPublication {
            authors: vec!["J Doe".to_string(), "A Smith".to_string()],
            journal: None,
            venue: Some("NeurIPS".to_string()),
            pub_year: Some("2019".to_string()),
            num_citations: None,
            pub_url: Some("https://example.org/p".to_string()),
            r#abstract: Some("<p>Short teaser</p>".to_string()),
            ..RawPublication::new("Fields")
        };
        let source = MockProfileSource::new(profile(vec![stub]));

        let result = aggregator(source, MockAbstractSource::found("crossref", "Complete text."))
            .aggregate("abc", &mut ProgressReporter::quiet())
            .await
            .unwrap();

        let publication = &result.publications[0];
        assert_eq!(publication.authors, vec!["J Doe", "A Smith"]);
        assert_eq!(publication.venue.as_deref(), Some("NeurIPS"));
        assert_eq!(publication.year, 2019);
        assert_eq!(publication.citations, 0);
        assert_eq!(publication.url.as_deref(), Some("https://example.org/p"));
        assert_eq!(publication.r#abstract.as_deref(), Some("Complete text."));
    }
}
