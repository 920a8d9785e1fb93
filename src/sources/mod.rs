//! Upstream data sources.
//!
//! Two kinds of sources feed an aggregation:
//!
//! - a [`ProfileSource`] lists an author's publications and fills in the
//!   detail record of each one (Google Scholar);
//! - [`AbstractSource`]s look up an abstract for a publication title
//!   (Crossref, Semantic Scholar, PubMed).
//!
//! Abstract sources are arranged into a fallback chain by the
//! [`SourceRegistry`] and consumed by the abstract resolver.
//!
//! # Adding an Abstract Source
//!
//! 1. Create a struct holding an [`HttpClient`](crate::utils::HttpClient) and a base URL
//! 2. Implement [`AbstractSource`], returning the raw (unsanitized) abstract
//! 3. Register it in [`SourceRegistry::from_config`] in the right tier

mod crossref;
mod google_scholar;
mod pubmed;
mod registry;
mod semantic;

pub mod mock;

pub use crossref::CrossRefSource;
pub use google_scholar::GoogleScholarSource;
pub use mock::{MockAbstractSource, MockProfileSource};
pub use pubmed::PubMedSource;
pub use registry::SourceRegistry;
pub use semantic::SemanticScholarSource;

use crate::models::{RawProfile, RawPublication};
use async_trait::async_trait;

/// A lookup service returning an optional abstract for a publication title.
///
/// Implementations return the abstract as delivered by the upstream API;
/// sanitizing is left to the caller. `Ok(None)` means the source answered but
/// had no abstract for the title.
#[async_trait]
pub trait AbstractSource: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g., "crossref", "semantic")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Look up an abstract by free-text title match
    async fn lookup_abstract(
        &self,
        title: &str,
        authors: &[String],
    ) -> Result<Option<String>, SourceError>;
}

/// An academic-profile source listing one author's publications.
#[async_trait]
pub trait ProfileSource: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source
    fn id(&self) -> &str;

    /// Fetch the author's profile and the stubs of all listed publications
    async fn fetch_profile(&self, author_id: &str) -> Result<RawProfile, SourceError>;

    /// Complete a publication stub with its detail record
    async fn fill_publication(
        &self,
        publication: &RawPublication,
    ) -> Result<RawPublication, SourceError>;
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error (XML, JSON, HTML, etc.)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// API error from the source
    #[error("API error: {0}")]
    Api(String),

    /// The source did not answer in time
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}

/// Check an upstream response status, turning non-2xx into an API error
pub(crate) fn check_status(
    response: reqwest::Response,
    source_name: &str,
) -> Result<reqwest::Response, SourceError> {
    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(SourceError::NotFound(format!(
            "{} returned 404 for {}",
            source_name,
            response.url()
        )));
    }
    if !status.is_success() {
        return Err(SourceError::Api(format!(
            "{} API returned status: {}",
            source_name, status
        )));
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SourceError::Api("CrossRef API returned status: 500".to_string());
        assert_eq!(err.to_string(), "API error: CrossRef API returned status: 500");

        let err = SourceError::Timeout(std::time::Duration::from_secs(3));
        assert_eq!(err.to_string(), "Timed out after 3s");
    }
}
