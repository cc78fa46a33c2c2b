//! OCR Types
//!
//! Extraction results and the Google Cloud Vision wire format.

use serde::{Deserialize, Serialize};

use crate::scan::{Bounds, PositionedFragment};

/// Text extraction provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrProvider {
    /// Google Cloud Vision TEXT_DETECTION
    GoogleVision,
    /// Canned fragments (tests and demos)
    Static,
}

/// Positioned text found on one image
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub fragments: Vec<PositionedFragment>,
    /// Provider used
    pub provider: OcrProvider,
}

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR provider not available: {0}")]
    ProviderNotAvailable(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("OCR request failed: {0}")]
    Http(String),

    #[error("OCR provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode OCR response: {0}")]
    Decode(String),
}

impl OcrError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::ProviderNotAvailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidImage(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

// Google Cloud Vision images:annotate structures

#[derive(Debug, Deserialize)]
pub(crate) struct AnnotateResponse {
    #[serde(default)]
    pub responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnnotateImageResponse {
    #[serde(default)]
    pub text_annotations: Vec<TextAnnotation>,
    pub error: Option<VisionStatus>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VisionStatus {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TextAnnotation {
    #[serde(default)]
    pub description: String,
    pub bounding_poly: Option<BoundingPoly>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BoundingPoly {
    #[serde(default)]
    pub vertices: Vec<Vertex>,
}

/// Vision omits zero coordinates from vertices
#[derive(Debug, Deserialize)]
pub(crate) struct Vertex {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl BoundingPoly {
    /// Axis-aligned box around the polygon
    pub fn to_bounds(&self) -> Bounds {
        if self.vertices.is_empty() {
            return Bounds::default();
        }

        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for v in &self.vertices {
            min_x = min_x.min(v.x);
            min_y = min_y.min(v.y);
            max_x = max_x.max(v.x);
            max_y = max_y.max(v.y);
        }

        Bounds::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

impl AnnotateImageResponse {
    /// Word-level fragments; the first annotation is the full-text block and is skipped
    pub fn into_fragments(self) -> Vec<PositionedFragment> {
        self.text_annotations
            .into_iter()
            .skip(1)
            .filter(|a| !a.description.trim().is_empty())
            .map(|a| {
                let bounds = a.bounding_poly.map(|p| p.to_bounds()).unwrap_or_default();
                PositionedFragment::new(a.description, bounds)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotations_to_fragments() {
        let json = r#"{
            "responses": [{
                "textAnnotations": [
                    {"description": "DUNE\nHERBERT", "boundingPoly": {"vertices": [{}, {"x": 100}, {"x": 100, "y": 400}, {"y": 400}]}},
                    {"description": "DUNE", "boundingPoly": {"vertices": [{"x": 40, "y": 10}, {"x": 60, "y": 10}, {"x": 60, "y": 30}, {"x": 40, "y": 30}]}},
                    {"description": "HERBERT", "boundingPoly": {"vertices": [{"x": 38, "y": 300}, {"x": 66, "y": 302}, {"x": 65, "y": 320}, {"x": 37, "y": 318}]}}
                ]
            }]
        }"#;

        let response: AnnotateResponse = serde_json::from_str(json).unwrap();
        let fragments = response.responses.into_iter().next().unwrap().into_fragments();

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].text, "DUNE");
        assert_eq!(fragments[0].bounds, Bounds::new(40.0, 10.0, 20.0, 20.0));
        assert_eq!(fragments[1].bounds, Bounds::new(37.0, 300.0, 29.0, 20.0));
    }

    #[test]
    fn test_missing_vertices_default_to_origin() {
        let poly = BoundingPoly { vertices: vec![] };
        assert_eq!(poly.to_bounds(), Bounds::default());
    }

    #[test]
    fn test_no_text_found() {
        let response: AnnotateResponse = serde_json::from_str(r#"{"responses": [{}]}"#).unwrap();
        let fragments = response.responses.into_iter().next().unwrap().into_fragments();
        assert!(fragments.is_empty());
    }
}
