//! Publication and author records produced by an aggregation run.

use serde::{Deserialize, Serialize};

/// A single publication with its resolved abstract
///
/// Publications are identified by title only; duplicate titles coming from
/// the profile source are kept as separate entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    /// Publication title
    pub title: String,

    /// Author names in the order given by the source
    #[serde(default)]
    pub authors: Vec<String>,

    /// Journal or venue name
    #[serde(default)]
    pub venue: Option<String>,

    /// Publication year (0 if unknown)
    #[serde(default)]
    pub year: i32,

    /// Citation count
    #[serde(default)]
    pub citations: u64,

    /// Link to the publication page
    #[serde(default)]
    pub url: Option<String>,

    /// Sanitized abstract text
    #[serde(default)]
    pub r#abstract: Option<String>,
}

impl Publication {
    /// Create a publication with only a title set
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            authors: Vec::new(),
            venue: None,
            year: 0,
            citations: 0,
            url: None,
            r#abstract: None,
        }
    }

    pub fn builder(title: impl Into<String>) -> PublicationBuilder {
        PublicationBuilder::new(title)
    }

    /// Whether an abstract was resolved for this publication
    pub fn has_abstract(&self) -> bool {
        self.r#abstract.as_ref().is_some_and(|a| !a.is_empty())
    }
}

/// Builder for constructing Publication objects
#[derive(Debug, Clone)]
pub struct PublicationBuilder {
    publication: Publication,
}

impl PublicationBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            publication: Publication::new(title),
        }
    }

    pub fn authors(mut self, authors: Vec<String>) -> Self {
        self.publication.authors = authors;
        self
    }

    pub fn venue(mut self, venue: Option<String>) -> Self {
        self.publication.venue = venue;
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.publication.year = year;
        self
    }

    pub fn citations(mut self, citations: u64) -> Self {
        self.publication.citations = citations;
        self
    }

    pub fn url(mut self, url: Option<String>) -> Self {
        self.publication.url = url;
        self
    }

    pub fn abstract_text(mut self, abstract_text: Option<String>) -> Self {
        self.publication.r#abstract = abstract_text;
        self
    }

    pub fn build(self) -> Publication {
        self.publication
    }
}

/// Author-level citation metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorRecord {
    /// Author display name
    pub name: String,

    /// Total citations across all publications
    pub citations: u64,

    /// h-index
    pub h_index: u32,

    /// i10-index
    pub i10_index: u32,
}

/// The unit that is cached and returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub author: AuthorRecord,

    /// Publications ordered by citation count, highest first
    pub publications: Vec<Publication>,
}

impl AggregationResult {
    /// Build a result, ordering publications by citation count descending.
    ///
    /// The sort is stable, so publications with equal counts keep the order
    /// in which the source listed them.
    pub fn new(author: AuthorRecord, mut publications: Vec<Publication>) -> Self {
        publications.sort_by(|a, b| b.citations.cmp(&a.citations));
        Self {
            author,
            publications,
        }
    }

    /// Number of publications that carry an abstract
    pub fn abstract_count(&self) -> usize {
        self.publications.iter().filter(|p| p.has_abstract()).count()
    }
}
