//! Face search provider abstraction
//!
//! The handler talks to the recognition service only through
//! [`FaceSearchProvider`], so tests can substitute a fake and the
//! production server plugs in [`RekognitionProvider`].

mod rekognition;

pub use rekognition::RekognitionProvider;

use crate::config::ProviderSettings;
use async_trait::async_trait;

/// Number of matches requested from the provider. Only the first is used.
pub const MAX_FACES: i32 = 1;

/// Minimum similarity (percent, inclusive) a match must reach.
pub const FACE_MATCH_THRESHOLD: f32 = 95.0;

/// A single "search faces by image" call.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub image: Vec<u8>,
    pub collection_id: String,
    pub max_faces: i32,
    pub face_match_threshold: f32,
}

impl SearchRequest {
    /// Build a request with the fixed result count and threshold.
    pub fn new(image: Vec<u8>, collection_id: impl Into<String>) -> Self {
        Self {
            image,
            collection_id: collection_id.into(),
            max_faces: MAX_FACES,
            face_match_threshold: FACE_MATCH_THRESHOLD,
        }
    }
}

/// Best match returned by the provider
#[derive(Debug, Clone, PartialEq)]
pub struct FaceMatch {
    pub face_id: String,
    pub similarity: Option<f32>,
}

/// Classified result of a provider call.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The first match carried a face id.
    Matched(FaceMatch),
    /// No match reached the threshold.
    NoMatch,
    /// The provider rejected the image bytes as malformed.
    InvalidImage(String),
    /// Any other provider or transport failure.
    Failed(String),
}

#[async_trait]
pub trait FaceSearchProvider: Send + Sync {
    /// Search the collection for the face in `request.image`.
    ///
    /// Exactly one upstream call is made; failures are reported through
    /// the returned outcome rather than retried.
    async fn search_faces_by_image(
        &self,
        settings: &ProviderSettings,
        request: SearchRequest,
    ) -> SearchOutcome;
}
