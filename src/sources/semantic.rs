//! Semantic Scholar abstract source.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::{HttpConfig, SourcesConfig};
use crate::sources::{check_status, AbstractSource, SourceError};
use crate::utils::HttpClient;

const SEMANTIC_API_BASE: &str = "https://api.semanticscholar.org/graph/v1";

/// Semantic Scholar abstract source
///
/// Uses the Graph API in two steps: a title search yields candidate paper
/// IDs, then each candidate's detail record is fetched until one carries an
/// abstract (search results do not include abstracts reliably).
#[derive(Debug, Clone)]
pub struct SemanticScholarSource {
    client: HttpClient,
    base_url: String,
    api_key: Option<String>,
    candidates: usize,
}

impl SemanticScholarSource {
    /// Create a new Semantic Scholar source
    pub fn new(http: &HttpConfig, sources: &SourcesConfig) -> Result<Self, SourceError> {
        Ok(Self {
            client: HttpClient::from_config(http)?,
            base_url: SEMANTIC_API_BASE.to_string(),
            api_key: sources.semantic_scholar_api_key.clone(),
            candidates: sources.semantic_candidates.max(1),
        })
    }

    /// Point the source at a different API root (for testing)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build request URL
    fn build_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Add API key to request headers if available
    fn add_api_key_if_present(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref key) = self.api_key {
            builder.header("x-api-key", key)
        } else {
            builder
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, endpoint: &str) -> Result<T, SourceError> {
        let response = self
            .add_api_key_if_present(self.client.get(&self.build_url(endpoint)))
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to query Semantic Scholar: {}", e)))?;

        check_status(response, self.name())?
            .json()
            .await
            .map_err(|e| SourceError::Parse(format!("Failed to parse JSON: {}", e)))
    }

    async fn search(&self, title: &str) -> Result<Vec<S2Paper>, SourceError> {
        let endpoint = format!(
            "/paper/search?query={}&fields=paperId,title,authors&limit={}",
            urlencoding::encode(title),
            self.candidates
        );
        let data: S2SearchResponse = self.get_json(&endpoint).await?;
        Ok(data.data)
    }

    async fn paper_details(&self, paper_id: &str) -> Result<S2Paper, SourceError> {
        let endpoint = format!(
            "/paper/{}?fields=title,abstract,venue,year,authors",
            urlencoding::encode(paper_id)
        );
        self.get_json(&endpoint).await
    }
}

#[async_trait]
impl AbstractSource for SemanticScholarSource {
    fn id(&self) -> &str {
        "semantic"
    }

    fn name(&self) -> &str {
        "Semantic Scholar"
    }

    async fn lookup_abstract(
        &self,
        title: &str,
        _authors: &[String],
    ) -> Result<Option<String>, SourceError> {
        let candidates = self.search(title).await?;

        for candidate in candidates {
            let Some(paper_id) = candidate.paper_id.as_deref() else {
                continue;
            };

            let details = self.paper_details(paper_id).await?;
            if let Some(abstract_text) = details.r#abstract.filter(|a| !a.trim().is_empty()) {
                tracing::debug!(
                    "Found paper in Semantic Scholar: {} ({} chars)",
                    details.title.as_deref().unwrap_or(paper_id),
                    abstract_text.len()
                );
                return Ok(Some(abstract_text));
            }
        }

        Ok(None)
    }
}

// ===== Semantic Scholar API Types =====

#[derive(Debug, Deserialize)]
struct S2Paper {
    #[serde(rename = "paperId")]
    paper_id: Option<String>,
    title: Option<String>,
    r#abstract: Option<String>,
}

#[derive(Debug, Deserialize)]
struct S2SearchResponse {
    #[serde(default)]
    data: Vec<S2Paper>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn source(base_url: &str) -> SemanticScholarSource {
        SemanticScholarSource::new(&HttpConfig::default(), &SourcesConfig::default())
            .unwrap()
            .with_base_url(base_url)
    }

    #[tokio::test]
    async fn test_search_then_detail() {
        let mut server = mockito::Server::new_async().await;
        let search = server
            .mock("GET", "/paper/search")
            .match_query(Matcher::UrlEncoded("query".into(), "Attention is all".into()))
            .with_status(200)
            .with_body(
                r#"{"total":3,"data":[
                    {"title":"No id"},
                    {"paperId":"p1","title":"Attention is all"},
                    {"paperId":"p2","title":"Attention again"}
                ]}"#,
            )
            .create_async()
            .await;
        let first = server
            .mock("GET", "/paper/p1")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"paperId":"p1","title":"Attention is all","abstract":null}"#)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/paper/p2")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"paperId":"p2","title":"Attention again","abstract":"Transformers."}"#)
            .create_async()
            .await;

        let found = source(&server.url())
            .lookup_abstract("Attention is all", &[])
            .await
            .unwrap();

        assert_eq!(found.as_deref(), Some("Transformers."));
        search.assert_async().await;
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_stops_at_first_abstract() {
        let mut server = mockito::Server::new_async().await;
        let _search = server
            .mock("GET", "/paper/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"data":[{"paperId":"a"},{"paperId":"b"}]}"#)
            .create_async()
            .await;
        let _first = server
            .mock("GET", "/paper/a")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"paperId":"a","abstract":"Found it."}"#)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/paper/b")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let found = source(&server.url()).lookup_abstract("x", &[]).await.unwrap();
        assert_eq!(found.as_deref(), Some("Found it."));
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_search_returns_none() {
        let mut server = mockito::Server::new_async().await;
        let _search = server
            .mock("GET", "/paper/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"total":0,"offset":0}"#)
            .create_async()
            .await;

        let found = source(&server.url()).lookup_abstract("x", &[]).await.unwrap();
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn test_rate_limited_search_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _search = server
            .mock("GET", "/paper/search")
            .match_query(Matcher::Any)
            .with_status(429)
            .create_async()
            .await;

        let result = source(&server.url()).lookup_abstract("x", &[]).await;
        assert!(matches!(result, Err(SourceError::Api(_))));
    }

    #[tokio::test]
    async fn test_api_key_header() {
        let mut server = mockito::Server::new_async().await;
        let search = server
            .mock("GET", "/paper/search")
            .match_query(Matcher::Any)
            .match_header("x-api-key", "secret")
            .with_status(200)
            .with_body(r#"{"data":[]}"#)
            .create_async()
            .await;

        let sources = SourcesConfig {
            semantic_scholar_api_key: Some("secret".to_string()),
            ..SourcesConfig::default()
        };
        let source = SemanticScholarSource::new(&HttpConfig::default(), &sources)
            .unwrap()
            .with_base_url(server.url());

        assert_eq!(source.lookup_abstract("x", &[]).await.unwrap(), None);
        search.assert_async().await;
    }
}
