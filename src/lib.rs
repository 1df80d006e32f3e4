//! Face Match Server - HTTP adapter for AWS Rekognition face search
//!
//! Exposes `POST /face-recognition`, which takes a base64 encoded photo,
//! searches a pre-provisioned Rekognition collection and answers with the
//! best matching face id.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! Provider settings come from `AWS_REGION`, `AWS_ACCESS_KEY_ID`,
//! `AWS_SECRET_ACCESS_KEY`, optional `AWS_SESSION_TOKEN`, and
//! `FACE_COLLECTION_ID`. Server settings use the `FACE_MATCH_SERVER__`
//! prefix or an optional `server.toml`.
//!
//! # Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `POST /face-recognition` - Match a face image

pub mod config;
pub mod error;
pub mod image;
pub mod middleware;
pub mod provider;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{ProviderConfig, ProviderSettings, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use provider::{FaceSearchProvider, RekognitionProvider, SearchOutcome, SearchRequest};
pub use server::{build_router, start_server};
pub use state::ServerState;
