//! CrossRef abstract source.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::{HttpConfig, SourcesConfig};
use crate::sources::{check_status, AbstractSource, SourceError};
use crate::utils::HttpClient;

const CROSSREF_API_BASE: &str = "https://api.crossref.org";

/// CrossRef abstract source
///
/// Searches the CrossRef REST API by title, restricted to works that carry
/// an abstract. Abstracts come back as JATS XML.
#[derive(Debug, Clone)]
pub struct CrossRefSource {
    client: HttpClient,
    base_url: String,
    rows: usize,
    mailto: Option<String>,
}

impl CrossRefSource {
    pub fn new(http: &HttpConfig, sources: &SourcesConfig) -> Result<Self, SourceError> {
        let user_agent = match &sources.crossref_mailto {
            Some(mailto) => format!(
                "{}/{} (mailto:{})",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                mailto
            ),
            None => format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        };

        Ok(Self {
            client: HttpClient::with_user_agent(&user_agent, http)?,
            base_url: CROSSREF_API_BASE.to_string(),
            rows: sources.crossref_rows.max(1),
            mailto: sources.crossref_mailto.clone(),
        })
    }

    /// Point the source at a different API root (for testing)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn search_url(&self, title: &str) -> String {
        let mut url = format!(
            "{}/works?query={}&filter=has-abstract:true&rows={}",
            self.base_url,
            urlencoding::encode(title),
            self.rows
        );
        if let Some(mailto) = &self.mailto {
            url.push_str(&format!("&mailto={}", urlencoding::encode(mailto)));
        }
        url
    }
}

#[async_trait]
impl AbstractSource for CrossRefSource {
    fn id(&self) -> &str {
        "crossref"
    }

    fn name(&self) -> &str {
        "CrossRef"
    }

    async fn lookup_abstract(
        &self,
        title: &str,
        _authors: &[String],
    ) -> Result<Option<String>, SourceError> {
        let response = self
            .client
            .get(&self.search_url(title))
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to search CrossRef: {}", e)))?;

        let data: CRResponse = check_status(response, self.name())?
            .json()
            .await
            .map_err(|e| SourceError::Parse(format!("Failed to parse JSON: {}", e)))?;

        let found = data.message.items.into_iter().find_map(|item| {
            let abstract_text = item.r#abstract.filter(|a| !a.trim().is_empty())?;
            tracing::debug!(
                "Found paper in CrossRef: {} ({} chars)",
                item.title.first().map(String::as_str).unwrap_or_default(),
                abstract_text.len()
            );
            Some(abstract_text)
        });

        Ok(found)
    }
}

// ===== CrossRef API Types =====

#[derive(Debug, Deserialize)]
struct CRResponse {
    message: CRMessage,
}

#[derive(Debug, Deserialize)]
struct CRMessage {
    #[serde(default)]
    items: Vec<CRItem>,
}

#[derive(Debug, Deserialize)]
struct CRItem {
    #[serde(default)]
    title: Vec<String>,
    #[serde(default)]
    r#abstract: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn source(base_url: &str) -> CrossRefSource {
        CrossRefSource::new(&HttpConfig::default(), &SourcesConfig::default())
            .unwrap()
            .with_base_url(base_url)
    }

    #[tokio::test]
    async fn test_lookup_returns_first_abstract() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/works")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "Graph neural networks".into()),
                Matcher::UrlEncoded("filter".into(), "has-abstract:true".into()),
                Matcher::UrlEncoded("rows".into(), "5".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"status":"ok","message":{"total-results":2,"items":[
                    {"title":["No abstract here"]},
                    {"title":["Graph neural networks"],"abstract":"<jats:p>GNNs are great.</jats:p>"}
                ]}}"#,
            )
            .create_async()
            .await;

        let found = source(&server.url())
            .lookup_abstract("Graph neural networks", &[])
            .await
            .unwrap();

        assert_eq!(found.as_deref(), Some("<jats:p>GNNs are great.</jats:p>"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_lookup_without_matches() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/works")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"message":{"items":[]}}"#)
            .create_async()
            .await;

        let found = source(&server.url())
            .lookup_abstract("Unknown title", &[])
            .await
            .unwrap();
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/works")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let result = source(&server.url()).lookup_abstract("Any", &[]).await;
        assert!(matches!(result, Err(SourceError::Api(_))));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/works")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let result = source(&server.url()).lookup_abstract("Any", &[]).await;
        assert!(matches!(result, Err(SourceError::Parse(_))));
    }

    #[test]
    fn test_search_url_includes_mailto() {
        let sources = SourcesConfig {
            crossref_mailto: Some("me@example.org".to_string()),
            ..SourcesConfig::default()
        };
        let source = CrossRefSource::new(&HttpConfig::default(), &sources).unwrap();
        let url = source.search_url("A & B");
        assert!(url.contains("query=A%20%26%20B"));
        assert!(url.ends_with("&mailto=me%40example.org"));
    }
}
