use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

use super::backend::InferenceBackend;
use super::traits::{failed_stream, ModelProvider};
use super::types::{ChunkStream, GenerateOptions, ProviderSettings};
use crate::constants::STREAM_CHANNEL_CAPACITY;
use crate::utils::ChatError;

/// Provider for backends without incremental output.
///
/// Fetches the whole reply with one `generate` call, then replays it one
/// character at a time with a fixed pause so the UI still shows it typing.
pub struct SimulatedStreamProvider {
    backend: Arc<dyn InferenceBackend>,
    settings: ProviderSettings,
}

impl SimulatedStreamProvider {
    pub fn new(backend: Arc<dyn InferenceBackend>, settings: ProviderSettings) -> Self {
        Self { backend, settings }
    }
}

#[async_trait]
impl ModelProvider for SimulatedStreamProvider {
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
        let delay = self.settings.chunk_delay;

        tokio::spawn(async move {
            let reply = match backend.generate(&request).await {
                Ok(reply) => reply,
                Err(e) => {
                    let _ = tx.send(Err(e)).await;
                    return;
                }
            };

            debug!(chars = reply.chars().count(), "replaying batch reply");
            for ch in reply.chars() {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                if tx.send(Ok(ch.to_string())).await.is_err() {
                    break;
                }
            }
        });

        ReceiverStream::new(rx)
    }

    fn streams_natively(&self) -> bool {
        false
    }
}
