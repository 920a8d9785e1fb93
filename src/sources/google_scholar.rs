//! Google Scholar profile source.
//!
//! Google Scholar does not have an official public API. Profiles and
//! publication detail pages are fetched as HTML and parsed with `scraper`.
//! Google may answer with a CAPTCHA page instead of the profile; that shows
//! up as a parse error on the profile fetch and fails the aggregation.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use crate::config::HttpConfig;
use crate::models::{RawProfile, RawPublication};
use crate::sources::{check_status, ProfileSource, SourceError};
use crate::utils::{HttpClient, BROWSER_USER_AGENT};

const GOOGLE_SCHOLAR_URL: &str = "https://scholar.google.com";

/// Rows requested per profile page (the maximum Scholar serves)
const PAGE_SIZE: usize = 100;

/// Safety stop for the profile pagination loop
const MAX_PAGES: usize = 50;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid CSS selector")
}

static NAME_SEL: LazyLock<Selector> = LazyLock::new(|| selector("#gsc_prf_in"));
static STATS_SEL: LazyLock<Selector> = LazyLock::new(|| selector("#gsc_rsb_st td.gsc_rsb_std"));
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| selector("tr.gsc_a_tr"));
static ROW_TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| selector("a.gsc_a_at"));
static ROW_GRAY_SEL: LazyLock<Selector> = LazyLock::new(|| selector("div.gs_gray"));
static ROW_CITES_SEL: LazyLock<Selector> = LazyLock::new(|| selector("a.gsc_a_ac"));
static ROW_YEAR_SEL: LazyLock<Selector> = LazyLock::new(|| selector("span.gsc_a_h"));
static DETAIL_TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| selector("#gsc_oci_title"));
static DETAIL_LINK_SEL: LazyLock<Selector> = LazyLock::new(|| selector("a.gsc_oci_title_link"));
static DETAIL_ROW_SEL: LazyLock<Selector> = LazyLock::new(|| selector("#gsc_oci_table div.gs_scl"));
static DETAIL_FIELD_SEL: LazyLock<Selector> = LazyLock::new(|| selector("div.gsc_oci_field"));
static DETAIL_VALUE_SEL: LazyLock<Selector> = LazyLock::new(|| selector("div.gsc_oci_value"));

/// Google Scholar profile source
#[derive(Debug, Clone)]
pub struct GoogleScholarSource {
    client: HttpClient,
    base_url: String,
}

impl GoogleScholarSource {
    pub fn new(http: &HttpConfig) -> Result<Self, SourceError> {
        Ok(Self {
            client: HttpClient::with_user_agent(BROWSER_USER_AGENT, http)?,
            base_url: GOOGLE_SCHOLAR_URL.to_string(),
        })
    }

    /// Point the source at a different host (for testing)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_html(&self, url: &str) -> Result<String, SourceError> {
        let response = self
            .client
            .get(url)
            .header("Accept-Language", "en-US,en;q=0.8")
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch Google Scholar page: {}", e)))?;

        check_status(response, "Google Scholar")?
            .text()
            .await
            .map_err(|e| SourceError::Parse(format!("Failed to read response: {}", e)))
    }

    fn profile_url(&self, author_id: &str, cstart: usize) -> String {
        format!(
            "{}/citations?hl=en&user={}&cstart={}&pagesize={}",
            self.base_url,
            urlencoding::encode(author_id),
            cstart,
            PAGE_SIZE
        )
    }

    fn detail_url(&self, detail_id: &str) -> String {
        format!(
            "{}/citations?view_op=view_citation&hl=en&citation_for_view={}",
            self.base_url,
            urlencoding::encode(detail_id)
        )
    }
}

#[async_trait]
impl ProfileSource for GoogleScholarSource {
    fn id(&self) -> &str {
        "google_scholar"
    }

    async fn fetch_profile(&self, author_id: &str) -> Result<RawProfile, SourceError> {
        if author_id.trim().is_empty() {
            return Err(SourceError::InvalidRequest("empty author id".to_string()));
        }

        let html = self.fetch_html(&self.profile_url(author_id, 0)).await?;
        let mut profile = parse_profile_page(&html)?;
        let mut last_page_len = profile.publications.len();

        let mut page = 1;
        while last_page_len == PAGE_SIZE && page < MAX_PAGES {
            let html = self
                .fetch_html(&self.profile_url(author_id, page * PAGE_SIZE))
                .await?;
            let rows = parse_publication_rows(&html);
            last_page_len = rows.len();
            profile.publications.extend(rows);
            page += 1;
        }

        tracing::info!(
            "Fetched Google Scholar profile of {} with {} publications",
            profile.name,
            profile.publications.len()
        );
        Ok(profile)
    }

    async fn fill_publication(
        &self,
        publication: &RawPublication,
    ) -> Result<RawPublication, SourceError> {
        let Some(detail_id) = publication.detail_id.as_deref() else {
            tracing::debug!("No detail link for {}, keeping listing data", publication.label());
            return Ok(publication.clone());
        };

        let html = self.fetch_html(&self.detail_url(detail_id)).await?;
        Ok(merge_detail(publication, &html))
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_count(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Pull the `citation_for_view` parameter out of a detail link
fn detail_id_from_href(href: &str) -> Option<String> {
    let query = href.split_once('?').map(|(_, q)| q).unwrap_or(href);
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "citation_for_view")
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(|value| value.into_owned())
}

/// Parse the first profile page: author header, metrics, and publication rows
pub(crate) fn parse_profile_page(html: &str) -> Result<RawProfile, SourceError> {
    let document = Html::parse_document(html);

    let name = document
        .select(&NAME_SEL)
        .next()
        .map(element_text)
        .and_then(non_empty)
        .ok_or_else(|| {
            SourceError::Parse(
                "author name not found on Google Scholar profile (blocked or unknown id)"
                    .to_string(),
            )
        })?;

    // Columns: citations (all, since), h-index (all, since), i10-index (all, since)
    let stats: Vec<u64> = document
        .select(&STATS_SEL)
        .map(|cell| parse_count(&element_text(cell)).unwrap_or(0))
        .collect();
    let stat = |idx: usize| stats.get(idx).copied().unwrap_or(0);

    Ok(RawProfile {
        name,
        citations: stat(0),
        h_index: u32::try_from(stat(2)).unwrap_or(u32::MAX),
        i10_index: u32::try_from(stat(4)).unwrap_or(u32::MAX),
        publications: rows_from_document(&document),
    })
}

/// Parse the publication rows of a profile page
pub(crate) fn parse_publication_rows(html: &str) -> Vec<RawPublication> {
    rows_from_document(&Html::parse_document(html))
}

fn rows_from_document(document: &Html) -> Vec<RawPublication> {
    document.select(&ROW_SEL).map(parse_row).collect()
}

fn parse_row(row: ElementRef<'_>) -> RawPublication {
    let title_link = row.select(&ROW_TITLE_SEL).next();
    let title = title_link.map(element_text).and_then(non_empty);
    let detail_id = title_link
        .and_then(|link| link.value().attr("href").or(link.value().attr("data-href")))
        .and_then(detail_id_from_href);

    let mut gray = row.select(&ROW_GRAY_SEL).map(element_text);
    let authors = gray
        .next()
        .map(|text| split_authors(&text))
        .unwrap_or_default();
    let pub_year = row
        .select(&ROW_YEAR_SEL)
        .next()
        .map(element_text)
        .and_then(non_empty);
    let venue = gray
        .next()
        .map(|text| strip_trailing_year(&text, pub_year.as_deref()))
        .and_then(non_empty);

    let num_citations = row
        .select(&ROW_CITES_SEL)
        .next()
        .and_then(|cell| parse_count(&element_text(cell)));

    RawPublication {
        detail_id,
        title,
        authors,
        journal: None,
        venue,
        pub_year,
        num_citations,
        pub_url: None,
        r#abstract: None,
    }
}

fn split_authors(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty() && *a != "...")
        .map(str::to_string)
        .collect()
}

/// Listing venues end with ", <year>"; drop it since the year has its own column
fn strip_trailing_year(venue: &str, year: Option<&str>) -> String {
    match year {
        Some(year) => venue
            .strip_suffix(year)
            .map(|v| v.trim_end().trim_end_matches(',').trim_end())
            .unwrap_or(venue)
            .to_string(),
        None => venue.to_string(),
    }
}

/// Combine a listing stub with the fields from its detail page
pub(crate) fn merge_detail(stub: &RawPublication, html: &str) -> RawPublication {
    let document = Html::parse_document(html);
    let mut filled = stub.clone();

    if let Some(title) = document
        .select(&DETAIL_TITLE_SEL)
        .next()
        .map(element_text)
        .and_then(non_empty)
    {
        filled.title = Some(title);
    }

    filled.pub_url = document
        .select(&DETAIL_LINK_SEL)
        .next()
        .and_then(|link| link.value().attr("href"))
        .map(str::to_string)
        .or(filled.pub_url);

    for row in document.select(&DETAIL_ROW_SEL) {
        let Some(field) = row.select(&DETAIL_FIELD_SEL).next().map(element_text) else {
            continue;
        };
        let Some(value) = row.select(&DETAIL_VALUE_SEL).next() else {
            continue;
        };

        match field.as_str() {
            "Authors" | "Inventors" => {
                let authors = split_authors(&element_text(value));
                if !authors.is_empty() {
                    filled.authors = authors;
                }
            }
            "Publication date" => {
                let date = element_text(value);
                if let Some(year) = date.split('/').next().and_then(|y| non_empty(y.to_string())) {
                    filled.pub_year = Some(year);
                }
            }
            "Journal" => filled.journal = non_empty(element_text(value)),
            "Conference" | "Book" | "Source" => {
                if let Some(venue) = non_empty(element_text(value)) {
                    filled.venue = Some(venue);
                }
            }
            // Keep the markup; the sanitizer strips it along with entities
            "Description" => filled.r#abstract = non_empty(value.inner_html().trim().to_string()),
            _ => {}
        }
    }

    filled
}
