use crate::config::{ProviderConfig, ServerConfig};
use crate::provider::FaceSearchProvider;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Provider settings, possibly incomplete
    pub provider_config: Arc<ProviderConfig>,

    /// Face search provider (shared across requests)
    pub provider: Arc<dyn FaceSearchProvider>,
}

impl ServerState {
    /// Create new server state
    pub fn new(
        config: ServerConfig,
        provider_config: ProviderConfig,
        provider: Arc<dyn FaceSearchProvider>,
    ) -> Self {
        let missing = provider_config.missing_keys();
        if !missing.is_empty() {
            tracing::warn!(
                missing = ?missing,
                "Provider settings incomplete; face recognition requests will fail"
            );
        }

        Self {
            config: Arc::new(config),
            provider_config: Arc::new(provider_config),
            provider,
        }
    }
}
