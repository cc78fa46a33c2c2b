//! OCR Providers
//!
//! Defines the text extraction trait and the Google Cloud Vision backend.

use std::time::Duration;

use async_trait::async_trait;

use super::types::{AnnotateResponse, ExtractionResult, OcrError, OcrProvider};
use crate::scan::PositionedFragment;

/// Text extraction provider trait
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract positioned text fragments from an encoded image
    async fn extract(&self, image_data: &[u8]) -> Result<ExtractionResult, OcrError>;
}

/// Google Cloud Vision TEXT_DETECTION provider
pub struct GoogleVisionExtractor {
    client: reqwest::Client,
    /// API base URL, e.g. "https://vision.googleapis.com/v1"
    base_url: String,
    api_key: String,
}

impl GoogleVisionExtractor {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OcrError::ProviderNotAvailable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl TextExtractor for GoogleVisionExtractor {
    async fn extract(&self, image_data: &[u8]) -> Result<ExtractionResult, OcrError> {
        use base64::Engine;

        if image_data.is_empty() {
            return Err(OcrError::InvalidImage("Image is empty".to_string()));
        }

        let url = format!(
            "{}/images:annotate?key={}",
            self.base_url,
            urlencoding::encode(&self.api_key)
        );

        // Encode image as base64
        let image_base64 = base64::engine::general_purpose::STANDARD.encode(image_data);

        let request = serde_json::json!({
            "requests": [{
                "image": { "content": image_base64 },
                "features": [{ "type": "TEXT_DETECTION" }]
            }]
        });

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| OcrError::Http(format!("Failed to call Vision API: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::Status { status, body });
        }

        let annotated: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| OcrError::Decode(e.to_string()))?;

        let Some(image) = annotated.responses.into_iter().next() else {
            return Ok(ExtractionResult {
                fragments: Vec::new(),
                provider: OcrProvider::GoogleVision,
            });
        };

        if let Some(error) = &image.error {
            return Err(OcrError::Status {
                status: 502,
                body: format!("Vision error {}: {}", error.code, error.message),
            });
        }

        let fragments = image.into_fragments();
        tracing::debug!(fragments = fragments.len(), "Vision text detection complete");

        Ok(ExtractionResult {
            fragments,
            provider: OcrProvider::GoogleVision,
        })
    }
}

/// Extractor returning a fixed set of fragments for every image
pub struct StaticExtractor {
    fragments: Vec<PositionedFragment>,
}

impl StaticExtractor {
    pub fn new(fragments: Vec<PositionedFragment>) -> Self {
        Self { fragments }
    }
}

#[async_trait]
impl TextExtractor for StaticExtractor {
    async fn extract(&self, image_data: &[u8]) -> Result<ExtractionResult, OcrError> {
        if image_data.is_empty() {
            return Err(OcrError::InvalidImage("Image is empty".to_string()));
        }
        Ok(ExtractionResult {
            fragments: self.fragments.clone(),
            provider: OcrProvider::Static,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::Bounds;

    #[tokio::test]
    async fn test_static_extractor() {
        let extractor = StaticExtractor::new(vec![PositionedFragment::new(
            "Dune",
            Bounds::new(0.0, 0.0, 10.0, 10.0),
        )]);

        let result = extractor.extract(b"png").await.unwrap();
        assert_eq!(result.fragments.len(), 1);
        assert_eq!(result.provider, OcrProvider::Static);

        assert!(matches!(extractor.extract(&[]).await, Err(OcrError::InvalidImage(_))));
    }

    #[tokio::test]
    async fn test_vision_rejects_empty_image() {
        let extractor =
            GoogleVisionExtractor::new("http://127.0.0.1:1", "key", Duration::from_secs(1)).unwrap();
        assert!(matches!(extractor.extract(&[]).await, Err(OcrError::InvalidImage(_))));
    }

    #[tokio::test]
    async fn test_vision_unreachable() {
        let extractor =
            GoogleVisionExtractor::new("http://127.0.0.1:1", "key", Duration::from_secs(1)).unwrap();
        assert!(matches!(extractor.extract(b"png").await, Err(OcrError::Http(_))));
    }
}
