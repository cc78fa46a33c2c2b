//! Shelf scan routes
//!
//! Endpoints for identifying books from OCR fragments or shelf photos, and
//! for merging consecutive frames of a live scan into a session.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::ocr::OcrError;
use crate::scan::{MatchResult, PositionedFragment, SessionSnapshot};
use crate::state::AppState;

/// Create the scan router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/fragments", post(scan_fragments))
        .route("/image", post(scan_image))
        .route("/sessions", post(create_session))
        .route("/sessions/:session_id", get(get_session))
        .route("/sessions/:session_id/fragments", post(scan_session_fragments))
}

/// Fragments already extracted by the client
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanFragmentsRequest {
    pub fragments: Vec<PositionedFragment>,
    /// Overrides the configured confidence floor
    #[serde(default)]
    pub confidence_threshold: Option<f64>,
}

/// Base64 shelf photo, optionally as a data URL
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanImageRequest {
    pub image: String,
    #[serde(default)]
    pub confidence_threshold: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    pub count: usize,
    pub matches: Vec<MatchResult>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanImageResponse {
    pub fragment_count: usize,
    pub count: usize,
    pub matches: Vec<MatchResult>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

/// Match books from positioned fragments
///
/// POST /api/v1/scan/fragments
async fn scan_fragments(
    State(state): State<AppState>,
    Json(request): Json<ScanFragmentsRequest>,
) -> Result<Json<ScanResponse>> {
    let threshold = validate_threshold(request.confidence_threshold)?;
    validate_fragments(&request.fragments)?;

    let matches = state
        .matcher()
        .match_books_from_fragments(&request.fragments, threshold)
        .await;

    Ok(Json(ScanResponse {
        count: matches.len(),
        matches,
    }))
}

/// Extract text from a shelf photo, then match books
///
/// POST /api/v1/scan/image
async fn scan_image(
    State(state): State<AppState>,
    Json(request): Json<ScanImageRequest>,
) -> Result<Json<ScanImageResponse>> {
    let threshold = validate_threshold(request.confidence_threshold)?;

    let extractor = state.extractor().ok_or_else(|| {
        OcrError::ProviderNotAvailable("Image scanning is not configured".to_string())
    })?;

    let image_data = decode_image(&request.image)?;
    let extraction = extractor.extract(&image_data).await?;

    tracing::info!(
        provider = ?extraction.provider,
        fragments = extraction.fragments.len(),
        "Extracted shelf text"
    );

    let matches = state
        .matcher()
        .match_books_from_fragments(&extraction.fragments, threshold)
        .await;

    Ok(Json(ScanImageResponse {
        fragment_count: extraction.fragments.len(),
        count: matches.len(),
        matches,
    }))
}

/// Start a live scanning session
///
/// POST /api/v1/scan/sessions
async fn create_session(State(state): State<AppState>) -> Json<CreateSessionResponse> {
    Json(CreateSessionResponse {
        session_id: state.sessions().create(),
    })
}

/// Get the merged matches of a session
///
/// GET /api/v1/scan/sessions/:session_id
async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>> {
    state
        .sessions()
        .get(&session_id)
        .map(Json)
        .ok_or_else(|| session_not_found(&session_id))
}

/// Match one frame and merge it into a session
///
/// POST /api/v1/scan/sessions/:session_id/fragments
async fn scan_session_fragments(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ScanFragmentsRequest>,
) -> Result<Json<SessionSnapshot>> {
    let threshold = validate_threshold(request.confidence_threshold)?;
    validate_fragments(&request.fragments)?;

    if state.sessions().get(&session_id).is_none() {
        return Err(session_not_found(&session_id));
    }

    let matches = state
        .matcher()
        .match_books_from_fragments(&request.fragments, threshold)
        .await;

    state
        .sessions()
        .merge_frame(&session_id, matches)
        .map(Json)
        .ok_or_else(|| session_not_found(&session_id))
}

fn session_not_found(session_id: &Uuid) -> AppError {
    AppError::NotFound(format!("Scan session not found: {}", session_id))
}

fn validate_threshold(threshold: Option<f64>) -> Result<Option<f64>> {
    match threshold {
        Some(t) if !(0.0..=1.0).contains(&t) => Err(AppError::BadRequest(format!(
            "confidenceThreshold must be within 0-1, got {}",
            t
        ))),
        other => Ok(other),
    }
}

fn validate_fragments(fragments: &[PositionedFragment]) -> Result<()> {
    for (index, fragment) in fragments.iter().enumerate() {
        let b = &fragment.bounds;
        let finite = [b.x, b.y, b.width, b.height].iter().all(|v| v.is_finite());
        if !finite || b.width < 0.0 || b.height < 0.0 {
            return Err(AppError::BadRequest(format!(
                "Fragment {} has invalid bounds",
                index
            )));
        }
    }
    Ok(())
}

/// Decode base64 image data, accepting a `data:<mime>;base64,` prefix
fn decode_image(image: &str) -> Result<Vec<u8>> {
    use base64::Engine;

    let payload = match image.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => image,
    };

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| AppError::BadRequest(format!("Invalid base64 image: {}", e)))?;

    if bytes.is_empty() {
        return Err(AppError::BadRequest("Image is empty".to_string()));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::ocr::{StaticExtractor, TextExtractor};
    use crate::scan::{Bounds, CandidateBook};
    use crate::search::mock::MockSearchProvider;

    fn dune_fragments() -> Vec<PositionedFragment> {
        vec![
            PositionedFragment::new("Dune", Bounds::new(40.0, 10.0, 20.0, 30.0)),
            PositionedFragment::new("Frank", Bounds::new(42.0, 60.0, 20.0, 30.0)),
            PositionedFragment::new("Herbert", Bounds::new(43.0, 110.0, 20.0, 30.0)),
        ]
    }

    fn provider() -> Arc<MockSearchProvider> {
        Arc::new(MockSearchProvider::new().with_response(
            "Dune Frank Herbert",
            vec![CandidateBook::new("dune1", "Dune", vec!["Frank Herbert".to_string()])],
        ))
    }

    fn app(extractor: Option<Arc<dyn TextExtractor>>) -> Router {
        let state = AppState::from_parts(Config::default(), provider(), extractor);
        crate::routes::router(state)
    }

    async fn send(app: Router, method: &str, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_scan_fragments() {
        let body = serde_json::json!({ "fragments": dune_fragments() });
        let (status, json) = send(app(None), "POST", "/api/v1/scan/fragments", body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 1);
        assert_eq!(json["matches"][0]["externalId"], "dune1");
        assert_eq!(json["matches"][0]["confidenceScore"], 0.456);
    }

    #[tokio::test]
    async fn test_scan_fragments_threshold_override() {
        let body = serde_json::json!({ "fragments": dune_fragments(), "confidenceThreshold": 0.5 });
        let (status, json) = send(app(None), "POST", "/api/v1/scan/fragments", body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 0);
    }

    #[tokio::test]
    async fn test_invalid_threshold_rejected() {
        let body = serde_json::json!({ "fragments": [], "confidenceThreshold": 1.5 });
        let (status, json) = send(app(None), "POST", "/api/v1/scan/fragments", body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_negative_bounds_rejected() {
        let body = serde_json::json!({
            "fragments": [{ "text": "Dune", "bounds": { "x": 0, "y": 0, "width": -1, "height": 5 } }]
        });
        let (status, _) = send(app(None), "POST", "/api/v1/scan/fragments", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_scan_image_without_extractor() {
        let body = serde_json::json!({ "image": "aGVsbG8=" });
        let (status, json) = send(app(None), "POST", "/api/v1/scan/image", body).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"], "ocr_unavailable");
    }

    #[tokio::test]
    async fn test_scan_image() {
        let extractor: Arc<dyn TextExtractor> = Arc::new(StaticExtractor::new(dune_fragments()));
        let body = serde_json::json!({ "image": "data:image/png;base64,aGVsbG8=" });
        let (status, json) = send(app(Some(extractor)), "POST", "/api/v1/scan/image", body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["fragmentCount"], 3);
        assert_eq!(json["matches"][0]["externalId"], "dune1");
    }

    #[tokio::test]
    async fn test_scan_image_bad_base64() {
        let extractor: Arc<dyn TextExtractor> = Arc::new(StaticExtractor::new(vec![]));
        let body = serde_json::json!({ "image": "not base64!" });
        let (status, _) = send(app(Some(extractor)), "POST", "/api/v1/scan/image", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_session_flow() {
        let app = app(None);

        let (status, created) = send(app.clone(), "POST", "/api/v1/scan/sessions", serde_json::Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        let session_id = created["sessionId"].as_str().unwrap().to_string();

        let frame = serde_json::json!({ "fragments": dune_fragments() });
        let uri = format!("/api/v1/scan/sessions/{}/fragments", session_id);
        send(app.clone(), "POST", &uri, frame.clone()).await;
        let (status, snapshot) = send(app.clone(), "POST", &uri, frame).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(snapshot["frames"], 2);
        assert_eq!(snapshot["matches"][0]["externalId"], "dune1");
        assert_eq!(snapshot["matches"][0]["framesSeen"], 2);

        let (status, fetched) = send(
            app,
            "GET",
            &format!("/api/v1/scan/sessions/{}", session_id),
            serde_json::Value::Null,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["sessionId"], session_id.as_str());
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let uri = format!("/api/v1/scan/sessions/{}", Uuid::new_v4());
        let (status, json) = send(app(None), "GET", &uri, serde_json::Value::Null).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "not_found");
    }

    #[test]
    fn test_decode_image() {
        assert_eq!(decode_image("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(decode_image("data:image/jpeg;base64,aGVsbG8=").unwrap(), b"hello");
        assert!(decode_image("").is_err());
    }
}
