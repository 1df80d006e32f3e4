use crate::error::{ServerError, ServerResult, MISSING_IMAGE_MESSAGE};
use crate::image::ImagePayload;
use crate::provider::{SearchOutcome, SearchRequest};
use crate::state::ServerState;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// JSON field carrying the base64 image
pub const IMAGE_FIELD: &str = "base64Data";

/// Body returned by `POST /face-recognition`, for both success and failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceMatchResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FaceMatchResponse {
    pub fn matched(face_id: impl Into<String>) -> Self {
        Self {
            success: true,
            face_id: Some(face_id.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            face_id: None,
            error: Some(error.into()),
        }
    }
}

/// Match a face image against the configured collection.
///
/// Body: `{ "base64Data": "<base64 image>" }`. The body is parsed without
/// requiring a JSON content type.
///
/// - 200 `{ "success": true, "faceId": "..." }`
/// - 400 missing or malformed image, or image rejected by the provider
/// - 413 body larger than `max_body_size_mb`
/// - 404 no face in the collection reaches the similarity threshold
/// - 500 provider settings incomplete or provider failure
pub async fn face_recognition(
    State(state): State<Arc<ServerState>>,
    body: Result<Bytes, BytesRejection>,
) -> ServerResult<Json<FaceMatchResponse>> {
    let body = body.map_err(|rejection| match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => {
            ServerError::PayloadTooLarge(state.config.max_body_size_mb)
        }
        _ => ServerError::BadRequest(rejection.body_text()),
    })?;

    let image_text = extract_image_field(&body)?;

    let settings = state.provider_config.resolve()?;

    let image = ImagePayload::from_base64(&image_text)
        .map_err(|err| ServerError::InvalidImage(err.to_string()))?;

    tracing::debug!(
        bytes = image.len(),
        collection_id = %settings.collection_id,
        "Searching collection by image"
    );

    let request = SearchRequest::new(image.into_bytes(), settings.collection_id.clone());
    let outcome = state
        .provider
        .search_faces_by_image(&settings, request)
        .await;

    response_from_outcome(outcome).map(Json)
}

/// Pull the base64 text out of the raw request body.
pub fn extract_image_field(body: &[u8]) -> ServerResult<String> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|err| ServerError::BadRequest(format!("Request body must be JSON: {err}")))?;

    match value.get(IMAGE_FIELD) {
        Some(Value::String(text)) if !text.trim().is_empty() => Ok(text.clone()),
        Some(Value::String(_)) | Some(Value::Null) | None => {
            Err(ServerError::BadRequest(MISSING_IMAGE_MESSAGE.to_string()))
        }
        Some(_) => Err(ServerError::BadRequest(format!(
            "{IMAGE_FIELD} must be a base64 string"
        ))),
    }
}

/// Map a provider outcome onto the response contract.
pub fn response_from_outcome(outcome: SearchOutcome) -> ServerResult<FaceMatchResponse> {
    match outcome {
        SearchOutcome::Matched(face) => {
            tracing::info!(face_id = %face.face_id, similarity = ?face.similarity, "Face matched");
            Ok(FaceMatchResponse::matched(face.face_id))
        }
        SearchOutcome::NoMatch => Err(ServerError::NoMatch),
        SearchOutcome::InvalidImage(detail) => Err(ServerError::InvalidImage(detail)),
        SearchOutcome::Failed(detail) => Err(ServerError::Internal(detail)),
    }
}
