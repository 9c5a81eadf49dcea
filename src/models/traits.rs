use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;

use super::types::{ChunkStream, GenerateOptions, GenerateRequest, ProviderSettings};
use crate::utils::ChatError;

/// Core trait that both provider variants implement
///
/// Capability set: list, switch, generate, stream. The two implementations
/// differ only in how `stream_response` is realized.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Active configuration
    fn settings(&self) -> &ProviderSettings;

    /// Replace the active configuration wholesale
    fn reinitialize(&mut self, settings: ProviderSettings);

    /// One synchronous round trip for the whole reply
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String, ChatError>;

    /// Start a new turn and return its chunks.
    ///
    /// The stream is finite and single-use; draining it yields the same text
    /// `generate` would for the same prompt and options.
    fn stream_response(&self, prompt: &str, options: &GenerateOptions) -> ChunkStream;

    /// Whether chunks come straight from the backend
    fn streams_natively(&self) -> bool;

    /// Model requests currently go to
    fn current_model(&self) -> Option<String> {
        self.settings().effective_model()
    }

    /// Model names known to the current configuration
    fn available_models(&self) -> Vec<String> {
        self.settings().available_models()
    }

    /// Select another model; it must be one of `available_models`
    fn switch_model(&mut self, name: &str) -> Result<(), ChatError> {
        let available = self.available_models();
        if !available.iter().any(|m| m == name) {
            return Err(ChatError::ModelNotAvailable {
                name: name.to_string(),
                available,
            });
        }

        let settings = ProviderSettings {
            current_model: Some(name.to_string()),
            ..self.settings().clone()
        };
        self.reinitialize(settings);
        info!(model = name, "switched model");
        Ok(())
    }

    /// Build the request for the current model, or fail if none is selected
    fn request_for(&self, prompt: &str, options: &GenerateOptions) -> Result<GenerateRequest, ChatError> {
        let model = self.current_model().ok_or(ChatError::NoModelSelected)?;
        Ok(GenerateRequest::new(&model, prompt, *options))
    }
}

/// A stream that yields a single error and ends
pub(crate) fn failed_stream(error: ChatError) -> ChunkStream {
    let (tx, rx) = mpsc::channel(1);
    // Capacity is 1 and the channel is fresh, so this cannot fail
    let _ = tx.try_send(Err(error));
    ReceiverStream::new(rx)
}
