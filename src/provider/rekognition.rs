use super::{FaceMatch, FaceSearchProvider, SearchOutcome, SearchRequest};
use crate::config::ProviderSettings;
use async_trait::async_trait;
use aws_sdk_rekognition::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_rekognition::error::{DisplayErrorContext, SdkError};
use aws_sdk_rekognition::operation::search_faces_by_image::{
    SearchFacesByImageError, SearchFacesByImageOutput,
};
use aws_sdk_rekognition::primitives::Blob;
use aws_sdk_rekognition::types::Image;
use aws_sdk_rekognition::Client;
use tokio::sync::OnceCell;

const CREDENTIALS_SOURCE: &str = "face-match-environment";

/// AWS Rekognition backed provider.
///
/// The SDK client is built on first use from the resolved settings and
/// shared by every later request.
#[derive(Debug, Default)]
pub struct RekognitionProvider {
    client: OnceCell<Client>,
}

impl RekognitionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    async fn client(&self, settings: &ProviderSettings) -> &Client {
        self.client
            .get_or_init(|| async { build_client(settings) })
            .await
    }
}

fn build_client(settings: &ProviderSettings) -> Client {
    let credentials = Credentials::new(
        settings.access_key_id.clone(),
        settings.secret_access_key.clone(),
        settings.session_token.clone(),
        None,
        CREDENTIALS_SOURCE,
    );

    let config = aws_sdk_rekognition::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(settings.region.clone()))
        .credentials_provider(credentials)
        .build();

    tracing::info!(region = %settings.region, "Rekognition client initialized");
    Client::from_conf(config)
}

#[async_trait]
impl FaceSearchProvider for RekognitionProvider {
    async fn search_faces_by_image(
        &self,
        settings: &ProviderSettings,
        request: SearchRequest,
    ) -> SearchOutcome {
        let client = self.client(settings).await;

        let result = client
            .search_faces_by_image()
            .collection_id(request.collection_id)
            .image(Image::builder().bytes(Blob::new(request.image)).build())
            .max_faces(request.max_faces)
            .face_match_threshold(request.face_match_threshold)
            .send()
            .await;

        match result {
            Ok(output) => outcome_from_output(&output),
            Err(err) => outcome_from_error(err),
        }
    }
}

fn outcome_from_output(output: &SearchFacesByImageOutput) -> SearchOutcome {
    let best = output.face_matches().first();

    match best.and_then(|m| m.face()).and_then(|f| f.face_id()) {
        Some(face_id) => SearchOutcome::Matched(FaceMatch {
            face_id: face_id.to_string(),
            similarity: best.and_then(|m| m.similarity()),
        }),
        None => SearchOutcome::NoMatch,
    }
}

fn outcome_from_error<R>(err: SdkError<SearchFacesByImageError, R>) -> SearchOutcome
where
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let detail = DisplayErrorContext(&err).to_string();

    match err.into_service_error() {
        SearchFacesByImageError::InvalidImageFormatException(_) => {
            SearchOutcome::InvalidImage(detail)
        }
        _ => SearchOutcome::Failed(detail),
    }
}
