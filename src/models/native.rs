use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::backend::InferenceBackend;
use super::traits::{failed_stream, ModelProvider};
use super::types::{ChunkStream, GenerateOptions, ProviderSettings};
use crate::constants::STREAM_CHANNEL_CAPACITY;
use crate::utils::ChatError;

/// Provider that forwards the backend's incremental output as it arrives
pub struct NativeStreamProvider {
    backend: Arc<dyn InferenceBackend>,
    settings: ProviderSettings,
}

impl NativeStreamProvider {
    pub fn new(backend: Arc<dyn InferenceBackend>, settings: ProviderSettings) -> Self {
        Self { backend, settings }
    }
}

#[async_trait]
impl ModelProvider for NativeStreamProvider {
    fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    fn reinitialize(&mut self, settings: ProviderSettings) {
        self.settings = settings;
    }

    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String, ChatError> {
        let request = self.request_for(prompt, options)?;
        self.backend.generate(&request).await
    }

    fn stream_response(&self, prompt: &str, options: &GenerateOptions) -> ChunkStream {
        let request = match self.request_for(prompt, options) {
            Ok(request) => request,
            Err(e) => return failed_stream(e),
        };

        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        let backend = Arc::clone(&self.backend);

        tokio::spawn(async move {
            if let Err(e) = backend.generate_stream(&request, tx.clone()).await {
                let _ = tx.send(Err(e)).await;
            }
        });

        ReceiverStream::new(rx)
    }

    fn streams_natively(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::stub::StubBackend;
    use futures::StreamExt;
    use pretty_assertions::assert_eq;

    fn settings() -> ProviderSettings {
        ProviderSettings::default()
            .with_models(["llama3.2", "gemma2"])
            .with_current_model("llama3.2")
    }

    #[tokio::test]
    async fn test_forwards_backend_fragments_in_order() {
        let provider = NativeStreamProvider::new(
            Arc::new(StubBackend::replying("one two three")),
            settings(),
        );

        let chunks: Vec<String> = provider
            .stream_response("count", &GenerateOptions::default())
            .map(|c| c.unwrap())
            .collect()
            .await;

        assert_eq!(chunks, vec!["one ", "two ", "three"]);
    }

    #[tokio::test]
    async fn test_stream_concatenation_matches_generate() {
        let provider = NativeStreamProvider::new(
            Arc::new(StubBackend::replying("The sky is blue because of Rayleigh scattering.")),
            settings(),
        );
        let options = GenerateOptions {
            temperature: 0.2,
            max_tokens: 64,
        };

        let streamed: String = provider
            .stream_response("why", &options)
            .map(|c| c.unwrap())
            .collect::<Vec<_>>()
            .await
            .concat();

        assert_eq!(streamed, provider.generate("why", &options).await.unwrap());
    }

    #[tokio::test]
    async fn test_requests_carry_qualified_model_and_options() {
        let backend = Arc::new(StubBackend::replying("ok"));
        let provider = NativeStreamProvider::new(backend.clone(), settings());
        let options = GenerateOptions {
            temperature: 0.1,
            max_tokens: 16,
        };

        provider.generate("ping", &options).await.unwrap();

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "ollama/llama3.2");
        assert_eq!(requests[0].prompt, "ping");
        assert_eq!(requests[0].options, options);
    }

    #[tokio::test]
    async fn test_mid_stream_failure_ends_with_error() {
        let backend = StubBackend::replying("one two three")
            .failing_after(1, ChatError::Backend("connection reset".to_string()));
        let provider = NativeStreamProvider::new(Arc::new(backend), settings());

        let chunks: Vec<_> = provider
            .stream_response("count", &GenerateOptions::default())
            .collect()
            .await;

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], Ok("one ".to_string()));
        assert_eq!(chunks[1], Err(ChatError::Backend("connection reset".to_string())));
    }

    #[test]
    fn test_switch_model_requires_membership() {
        let mut provider =
            NativeStreamProvider::new(Arc::new(StubBackend::replying("ok")), settings());

        let err = provider.switch_model("mistral").unwrap_err();
        assert_eq!(
            err,
            ChatError::ModelNotAvailable {
                name: "mistral".to_string(),
                available: vec!["llama3.2".to_string(), "gemma2".to_string()],
            }
        );
        assert_eq!(provider.current_model(), Some("llama3.2".to_string()));

        provider.switch_model("gemma2").unwrap();
        assert_eq!(provider.current_model(), Some("gemma2".to_string()));
        assert_eq!(provider.available_models(), vec!["llama3.2", "gemma2"]);
    }

    #[tokio::test]
    async fn test_no_model_selected() {
        let provider = NativeStreamProvider::new(
            Arc::new(StubBackend::replying("ok")),
            ProviderSettings::default().with_models(["llama3.2"]),
        );

        assert_eq!(
            provider.generate("hi", &GenerateOptions::default()).await,
            Err(ChatError::NoModelSelected)
        );

        let chunks: Vec<_> = provider
            .stream_response("hi", &GenerateOptions::default())
            .collect()
            .await;
        assert_eq!(chunks, vec![Err(ChatError::NoModelSelected)]);
    }
}
