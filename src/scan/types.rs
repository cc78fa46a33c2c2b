//! Scan Types
//!
//! Data shapes flowing through the shelf-scan pipeline: positioned OCR
//! fragments in, ranked book matches out.

use serde::{Deserialize, Serialize};

/// Axis-aligned box in image pixel space (origin top-left)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Horizontal center of the box
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }
}

/// One text token or phrase detected on the image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedFragment {
    /// Raw OCR text (casing and punctuation noise included)
    pub text: String,
    pub bounds: Bounds,
}

impl PositionedFragment {
    pub fn new(text: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            text: text.into(),
            bounds,
        }
    }
}

/// Fragment texts hypothesized to belong to one book spine, top to bottom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpineCluster {
    texts: Vec<String>,
}

impl SpineCluster {
    pub(crate) fn new(texts: Vec<String>) -> Self {
        Self { texts }
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    /// Space-joined, trimmed text of the spine
    pub fn joined(&self) -> String {
        self.texts.join(" ").trim().to_string()
    }
}

/// Bibliographic record returned by a search provider
///
/// `external_id` is the provider's canonical identifier and the dedup key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateBook {
    pub external_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn13: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn10: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl CandidateBook {
    /// Minimal record with only identity, title and authors set
    pub fn new(external_id: impl Into<String>, title: impl Into<String>, authors: Vec<String>) -> Self {
        Self {
            external_id: external_id.into(),
            title: title.into(),
            subtitle: None,
            authors,
            published_date: None,
            page_count: None,
            cover_image_url: None,
            description: None,
            isbn13: None,
            isbn10: None,
            categories: None,
            publisher: None,
            average_rating: None,
            language: None,
        }
    }
}

/// A candidate book accepted for one spine cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    #[serde(flatten)]
    pub book: CandidateBook,
    /// Re-scored confidence in [0, 1], rounded to 3 decimals
    pub confidence_score: f64,
    /// Texts of the originating cluster, kept for auditing
    pub matched_fragments: Vec<String>,
}

impl MatchResult {
    pub fn external_id(&self) -> &str {
        &self.book.external_id
    }
}
