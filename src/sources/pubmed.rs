//! PubMed abstract source using the E-utilities API.

use async_trait::async_trait;
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::config::HttpConfig;
use crate::sources::{check_status, AbstractSource, SourceError};
use crate::utils::HttpClient;

/// PubMed E-utilities API base URL
const PUBMED_EUTILS_BASE: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// PubMed abstract source
///
/// Searches PubMed for the title and joins the `<AbstractText>` sections of
/// the best match from the efetch XML.
#[derive(Debug, Clone)]
pub struct PubMedSource {
    client: HttpClient,
    base_url: String,
}

impl PubMedSource {
    /// Create a new PubMed source
    pub fn new(http: &HttpConfig) -> Result<Self, SourceError> {
        Ok(Self {
            client: HttpClient::from_config(http)?,
            base_url: PUBMED_EUTILS_BASE.to_string(),
        })
    }

    /// Point the source at a different E-utilities root (for testing)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn search_id(&self, title: &str) -> Result<Option<String>, SourceError> {
        let url = format!(
            "{}/esearch.fcgi?db=pubmed&term={}&retmode=json",
            self.base_url,
            urlencoding::encode(title)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to search PubMed: {}", e)))?;

        let data: ESearchResponse = check_status(response, self.name())?
            .json()
            .await
            .map_err(|e| SourceError::Parse(format!("Failed to parse JSON: {}", e)))?;

        Ok(data.esearchresult.idlist.into_iter().next())
    }

    async fn fetch_record(&self, pubmed_id: &str) -> Result<String, SourceError> {
        let url = format!(
            "{}/efetch.fcgi?db=pubmed&id={}&retmode=xml",
            self.base_url,
            urlencoding::encode(pubmed_id)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch PubMed record: {}", e)))?;

        check_status(response, self.name())?
            .text()
            .await
            .map_err(|e| SourceError::Parse(format!("Failed to read response: {}", e)))
    }

    /// Parse efetch XML and join the `AbstractText` sections of the first article
    fn parse_abstract(xml: &str) -> Result<Option<String>, SourceError> {
        let result: PubmedArticleSet = from_str(xml)
            .map_err(|e| SourceError::Parse(format!("Failed to parse PubMed fetch XML: {}", e)))?;

        let sections = result
            .articles
            .into_iter()
            .next()
            .and_then(|article| article.MedlineCitation)
            .and_then(|citation| citation.Article)
            .and_then(|article| article.Abstract)
            .map(|abs| abs.abstract_texts)
            .unwrap_or_default();

        let text = sections
            .iter()
            .map(|section| section.text.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Ok(Some(text).filter(|t| !t.is_empty()))
    }
}

#[async_trait]
impl AbstractSource for PubMedSource {
    fn id(&self) -> &str {
        "pubmed"
    }

    fn name(&self) -> &str {
        "PubMed"
    }

    async fn lookup_abstract(
        &self,
        title: &str,
        _authors: &[String],
    ) -> Result<Option<String>, SourceError> {
        let Some(pubmed_id) = self.search_id(title).await? else {
            return Ok(None);
        };

        let xml = self.fetch_record(&pubmed_id).await?;
        let found = Self::parse_abstract(&xml)?;
        if let Some(text) = &found {
            tracing::debug!("Found paper in PubMed: {} ({} chars)", pubmed_id, text.len());
        }
        Ok(found)
    }
}

// ===== E-utilities API Types =====

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    esearchresult: ESearchResult,
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PubmedArticleSet {
    #[serde(rename = "PubmedArticle", default)]
    articles: Vec<PubmedArticle>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct PubmedArticle {
    MedlineCitation: Option<MedlineCitation>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct MedlineCitation {
    Article: Option<Article>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct Article {
    Abstract: Option<Abstract>,
}

#[derive(Debug, Deserialize)]
struct Abstract {
    #[serde(rename = "AbstractText", default)]
    abstract_texts: Vec<AbstractText>,
}

#[derive(Debug, Deserialize)]
struct AbstractText {
    #[serde(rename = "$text", default)]
    text: String,
}
