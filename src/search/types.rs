//! Search Types
//!
//! Error type for bibliographic search and the Google Books wire format.

use serde::Deserialize;

use crate::scan::CandidateBook;

/// Title used when a provider record carries none
pub const FALLBACK_TITLE: &str = "Unknown Title";

/// Bibliographic search error types
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Search provider not configured: {0}")]
    NotConfigured(String),

    #[error("Search request failed: {0}")]
    Http(String),

    #[error("Search provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode search response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SearchError::Decode(err.to_string())
        } else {
            SearchError::Http(err.to_string())
        }
    }
}

// Google Books volumes API structures

#[derive(Debug, Deserialize)]
pub(crate) struct VolumesResponse {
    #[serde(default)]
    pub items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Volume {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VolumeInfo {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    pub published_date: Option<String>,
    pub page_count: Option<u32>,
    pub image_links: Option<ImageLinks>,
    pub description: Option<String>,
    #[serde(default)]
    pub industry_identifiers: Vec<IndustryIdentifier>,
    pub categories: Option<Vec<String>>,
    pub publisher: Option<String>,
    pub average_rating: Option<f64>,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImageLinks {
    pub thumbnail: Option<String>,
    pub small_thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IndustryIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub identifier: String,
}

impl Volume {
    /// Normalize into a candidate, defaulting missing title and authors.
    ///
    /// Volumes without an id cannot be deduplicated and are dropped.
    pub fn into_candidate(self) -> Option<CandidateBook> {
        let external_id = self.id.filter(|id| !id.is_empty())?;
        let info = self.volume_info;

        let identifier = |kind: &str| {
            info.industry_identifiers
                .iter()
                .find(|i| i.kind == kind)
                .map(|i| i.identifier.clone())
        };
        let isbn13 = identifier("ISBN_13");
        let isbn10 = identifier("ISBN_10");

        let cover_image_url = info
            .image_links
            .and_then(|links| links.thumbnail.or(links.small_thumbnail))
            .map(|url| match url.strip_prefix("http://") {
                Some(rest) => format!("https://{}", rest),
                None => url,
            });

        let title = info
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_TITLE.to_string());

        Some(CandidateBook {
            external_id,
            title,
            subtitle: info.subtitle,
            authors: info.authors,
            published_date: info.published_date,
            page_count: info.page_count,
            cover_image_url,
            description: info.description,
            isbn13,
            isbn10,
            categories: info.categories,
            publisher: info.publisher,
            average_rating: info.average_rating,
            language: info.language,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_into_candidate() {
        let json = r#"{
            "items": [{
                "id": "B1hSG45JCX4C",
                "volumeInfo": {
                    "title": "Dune",
                    "authors": ["Frank Herbert"],
                    "publishedDate": "2003",
                    "pageCount": 528,
                    "industryIdentifiers": [
                        {"type": "ISBN_10", "identifier": "0441013597"},
                        {"type": "ISBN_13", "identifier": "9780441013593"}
                    ],
                    "imageLinks": {"thumbnail": "http://books.google.com/cover.jpg"},
                    "averageRating": 4.5,
                    "language": "en"
                }
            }]
        }"#;

        let response: VolumesResponse = serde_json::from_str(json).unwrap();
        let book = response.items.into_iter().next().unwrap().into_candidate().unwrap();

        assert_eq!(book.external_id, "B1hSG45JCX4C");
        assert_eq!(book.title, "Dune");
        assert_eq!(book.authors, vec!["Frank Herbert".to_string()]);
        assert_eq!(book.isbn13.as_deref(), Some("9780441013593"));
        assert_eq!(book.isbn10.as_deref(), Some("0441013597"));
        assert_eq!(book.cover_image_url.as_deref(), Some("https://books.google.com/cover.jpg"));
        assert_eq!(book.page_count, Some(528));
        assert_eq!(book.average_rating, Some(4.5));
    }

    #[test]
    fn test_missing_fields_defaulted() {
        let json = r#"{"items": [{"id": "x1"}, {"volumeInfo": {"title": "No Id"}}]}"#;
        let response: VolumesResponse = serde_json::from_str(json).unwrap();
        let books: Vec<CandidateBook> = response
            .items
            .into_iter()
            .filter_map(Volume::into_candidate)
            .collect();

        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, FALLBACK_TITLE);
        assert!(books[0].authors.is_empty());
    }

    #[test]
    fn test_empty_response() {
        let response: VolumesResponse = serde_json::from_str(r#"{"totalItems": 0}"#).unwrap();
        assert!(response.items.is_empty());
    }
}
