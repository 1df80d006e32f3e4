//! API route handlers
//!
//! - `face`: face recognition against the configured collection
//! - `health`: liveness probe

pub mod face;
pub mod health;

use crate::error::ServerError;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info
///
/// # Response
///
/// ```json
/// {
///   "name": "Face Match Server",
///   "version": "0.1.0",
///   "endpoints": ["..."]
/// }
/// ```
pub async fn api_info() -> impl IntoResponse {
    Json(json!({
        "name": "Face Match Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "POST /face-recognition",
            "GET /health"
        ]
    }))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
