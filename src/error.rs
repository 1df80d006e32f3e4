use crate::routes::face::FaceMatchResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub type ServerResult<T> = Result<T, ServerError>;

pub const MISSING_IMAGE_MESSAGE: &str = "Image data is required";
pub const INVALID_IMAGE_MESSAGE: &str = "Invalid image format";
pub const NO_MATCH_MESSAGE: &str = "No matching face found";
pub const CONFIG_ERROR_MESSAGE: &str = "Server configuration error";
pub const PROCESSING_ERROR_MESSAGE: &str = "An error occurred while processing the image";

/// Server error types
///
/// The `Display` text carries operator detail and is only ever logged.
/// Clients see [`ServerError::public_message`].
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Payload too large: max {0}MB allowed")]
    PayloadTooLarge(usize),

    #[error("No matching face")]
    NoMatch,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Not found")]
    NotFound,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) | ServerError::InvalidImage(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::NoMatch | ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Config(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message returned to the client
    pub fn public_message(&self) -> String {
        match self {
            ServerError::BadRequest(msg) => msg.clone(),
            ServerError::InvalidImage(_) => INVALID_IMAGE_MESSAGE.to_string(),
            ServerError::PayloadTooLarge(_) => self.to_string(),
            ServerError::NoMatch => NO_MATCH_MESSAGE.to_string(),
            ServerError::NotFound => "Not found".to_string(),
            ServerError::Config(_) => CONFIG_ERROR_MESSAGE.to_string(),
            ServerError::Internal(_) => PROCESSING_ERROR_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Request failed");
        } else {
            tracing::warn!(status = %status, error = %self, "Request rejected");
        }

        (status, Json(FaceMatchResponse::failure(self.public_message()))).into_response()
    }
}
