//! Search Providers
//!
//! Defines the bibliographic search trait and the Google Books backend.

use std::time::Duration;

use async_trait::async_trait;

use super::types::{SearchError, Volume, VolumesResponse};
use crate::scan::CandidateBook;

/// Bibliographic search provider trait
#[async_trait]
pub trait BookSearchProvider: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &'static str;

    /// Free-text search returning at most `max_results` candidates
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<CandidateBook>, SearchError>;
}

/// Google Books volumes API provider
pub struct GoogleBooksProvider {
    client: reqwest::Client,
    /// API base URL, e.g. "https://www.googleapis.com/books/v1"
    base_url: String,
    api_key: Option<String>,
}

impl GoogleBooksProvider {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::NotConfigured(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn volumes_url(&self, query: &str, max_results: usize) -> String {
        let mut url = format!(
            "{}/volumes?q={}&maxResults={}",
            self.base_url,
            urlencoding::encode(query),
            max_results
        );
        if let Some(key) = &self.api_key {
            url.push_str("&key=");
            url.push_str(&urlencoding::encode(key));
        }
        url
    }
}

#[async_trait]
impl BookSearchProvider for GoogleBooksProvider {
    fn name(&self) -> &'static str {
        "google-books"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<CandidateBook>, SearchError> {
        let response = self.client.get(self.volumes_url(query, max_results)).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status { status, body });
        }

        let volumes: VolumesResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))?;

        Ok(volumes
            .items
            .into_iter()
            .filter_map(Volume::into_candidate)
            .take(max_results)
            .collect())
    }
}
