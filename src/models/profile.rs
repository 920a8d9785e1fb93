//! Raw records returned by an academic-profile source.
//!
//! These mirror what the profile page exposes before any normalization:
//! years are free text, venues come in two flavours, and the abstract (when
//! present) may be truncated or contain markup.

use serde::{Deserialize, Serialize};

/// An author's profile with the publication stubs listed on it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProfile {
    pub name: String,
    pub citations: u64,
    pub h_index: u32,
    pub i10_index: u32,
    pub publications: Vec<RawPublication>,
}

/// A publication as reported by the profile source
///
/// Stubs from the profile listing carry title, authors, venue, year and
/// citation count; filling a stub adds the detail fields (full author list,
/// journal, url, abstract).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPublication {
    /// Source-specific identifier used to fetch the detail record
    pub detail_id: Option<String>,
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub journal: Option<String>,
    pub venue: Option<String>,
    pub pub_year: Option<String>,
    pub num_citations: Option<u64>,
    pub pub_url: Option<String>,
    pub r#abstract: Option<String>,
}

impl RawPublication {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Title, if present and not blank
    pub fn title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Journal name, falling back to the generic venue field
    pub fn venue(&self) -> Option<String> {
        self.journal
            .as_deref()
            .or(self.venue.as_deref())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Publication year, 0 when missing or not an integer
    pub fn year(&self) -> i32 {
        self.pub_year
            .as_deref()
            .and_then(|y| y.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Label shown in progress events
    pub fn label(&self) -> &str {
        self.title().unwrap_or("Untitled publication")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_parsing() {
        let mut publication = RawPublication::new("t");
        assert_eq!(publication.year(), 0);

        publication.pub_year = Some("2019".to_string());
        assert_eq!(publication.year(), 2019);

        publication.pub_year = Some(" 2020 ".to_string());
        assert_eq!(publication.year(), 2020);

        publication.pub_year = Some("2019/05/01".to_string());
        assert_eq!(publication.year(), 0);
    }

    #[test]
    fn test_venue_prefers_journal() {
        let mut publication = RawPublication::new("t");
        publication.venue = Some("NeurIPS".to_string());
        assert_eq!(publication.venue().as_deref(), Some("NeurIPS"));

        publication.journal = Some("Nature".to_string());
        assert_eq!(publication.venue().as_deref(), Some("Nature"));
    }

    #[test]
    fn test_blank_title_is_absent() {
        let publication = RawPublication::new("   ");
        assert_eq!(publication.title(), None);
        assert_eq!(publication.label(), "Untitled publication");
    }
}
