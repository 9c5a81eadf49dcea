use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::backend::{InferenceBackend, OllamaClient};
use super::native::NativeStreamProvider;
use super::simulated::SimulatedStreamProvider;
use super::traits::ModelProvider;
use super::types::{ProviderSettings, StreamMode};
use crate::app::Config;
use crate::utils::ChatError;

/// Factory for creating providers, picking the streaming variant up front
pub struct ProviderFactory;

impl ProviderFactory {
    /// Wrap a backend in the provider variant matching `mode`.
    /// `StreamMode::Auto` goes by what the backend says it can do.
    pub fn create(
        backend: Arc<dyn InferenceBackend>,
        settings: ProviderSettings,
        mode: StreamMode,
    ) -> Box<dyn ModelProvider> {
        let native = match mode {
            StreamMode::Native => true,
            StreamMode::Simulated => false,
            StreamMode::Auto => backend.supports_streaming(),
        };

        debug!(?mode, native, "creating model provider");
        if native {
            Box::new(NativeStreamProvider::new(backend, settings))
        } else {
            Box::new(SimulatedStreamProvider::new(backend, settings))
        }
    }

    /// Build an Ollama-backed provider from configuration.
    ///
    /// `models` is used when the config does not pin its own list.
    pub fn from_config(
        config: &Config,
        models: Vec<String>,
        current_model: Option<String>,
    ) -> Result<Box<dyn ModelProvider>, ChatError> {
        let server_address = config.ollama.server_address();
        let backend = Arc::new(OllamaClient::new(&server_address)?);

        let mut settings = ProviderSettings::new(server_address)
            .with_policy(config.model.policy)
            .with_chunk_delay(Duration::from_millis(config.stream.chunk_delay_ms));
        settings = if config.model.models.is_empty() {
            settings.with_models(models)
        } else {
            settings.with_models(config.model.models.clone()).pin_models()
        };
        settings.current_model = current_model;

        Ok(Self::create(backend, settings, config.stream.mode))
    }
}
