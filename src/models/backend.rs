use async_trait::async_trait;
use bytes::BytesMut;
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::types::{ChunkSender, GenerateRequest};
use crate::constants::{HEALTH_CHECK_TIMEOUT_MS, HTTP_REQUEST_TIMEOUT_SECS};
use crate::utils::ChatError;

/// The raw inference API a provider drives
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Whether `generate_stream` yields output incrementally
    fn supports_streaming(&self) -> bool;

    /// One synchronous round trip, returning the whole reply
    async fn generate(&self, request: &GenerateRequest) -> Result<String, ChatError>;

    /// Push reply fragments into `chunks` as the backend produces them.
    ///
    /// Returns once the backend reports completion or fails; fragments already
    /// sent stay sent.
    async fn generate_stream(
        &self,
        request: &GenerateRequest,
        chunks: ChunkSender,
    ) -> Result<(), ChatError>;

    /// Check the server answers at all
    async fn is_reachable(&self) -> bool {
        true
    }
}

/// HTTP client for the Ollama generation API
pub struct OllamaClient {
    client: Client,
    server_address: String,
}

impl OllamaClient {
    pub fn new(server_address: impl Into<String>) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ChatError::Backend(e.to_string()))?;

        Ok(Self {
            client,
            server_address: server_address.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn server_address(&self) -> &str {
        &self.server_address
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.server_address)
    }

    /// Send a generate request and turn transport/HTTP failures into session errors
    async fn send(
        &self,
        request: &GenerateRequest,
        stream: bool,
    ) -> Result<reqwest::Response, ChatError> {
        let body = json!({
            "model": request.model_name(),
            "prompt": request.prompt,
            "stream": stream,
            "options": {
                "temperature": request.options.temperature,
                "num_predict": request.options.max_tokens,
            },
        });

        debug!(model = %request.model, stream, "sending generate request");

        let response = self
            .client
            .post(self.generate_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        Err(map_status_error(status, &error_text, request.model_name()))
    }

    fn map_transport_error(&self, error: reqwest::Error) -> ChatError {
        if error.is_connect() {
            ChatError::BackendUnreachable(self.server_address.clone())
        } else {
            ChatError::Backend(error.to_string())
        }
    }
}

#[async_trait]
impl InferenceBackend for OllamaClient {
    fn supports_streaming(&self) -> bool {
        true
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String, ChatError> {
        let response = self.send(request, false).await?;
        let reply: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Backend(format!("Invalid response from Ollama: {}", e)))?;

        match reply.error {
            Some(error) => Err(map_error_message(&error, request.model_name())),
            None => Ok(reply.response.unwrap_or_default()),
        }
    }

    async fn generate_stream(
        &self,
        request: &GenerateRequest,
        chunks: ChunkSender,
    ) -> Result<(), ChatError> {
        let response = self.send(request, true).await?;
        let mut body = response.bytes_stream();
        let mut buffer = BytesMut::new();

        while let Some(bytes) = body.next().await {
            let bytes = bytes.map_err(|e| self.map_transport_error(e))?;
            buffer.extend_from_slice(&bytes);

            // NDJSON: one object per line, possibly split across network frames
            while let Some(newline) = buffer.iter().position(|b| *b == b'\n') {
                let line = buffer.split_to(newline + 1);
                let line = String::from_utf8_lossy(&line);
                match parse_stream_line(&line, request.model_name())? {
                    StreamLine::Fragment(text) => {
                        if chunks.send(Ok(text)).await.is_err() {
                            // Consumer went away; nothing left to do
                            return Ok(());
                        }
                    }
                    StreamLine::Done => return Ok(()),
                    StreamLine::Empty => {}
                }
            }
        }

        // Trailing line without a newline
        let rest = String::from_utf8_lossy(&buffer).to_string();
        if let StreamLine::Fragment(text) = parse_stream_line(&rest, request.model_name())? {
            let _ = chunks.send(Ok(text)).await;
        }

        Ok(())
    }

    async fn is_reachable(&self) -> bool {
        let health_client = match Client::builder()
            .timeout(Duration::from_millis(HEALTH_CHECK_TIMEOUT_MS))
            .build()
        {
            Ok(client) => client,
            Err(_) => return false,
        };

        match health_client
            .get(format!("{}/api/tags", self.server_address))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

/// One decoded line of a streaming reply
#[derive(Debug, PartialEq)]
enum StreamLine {
    Fragment(String),
    Done,
    Empty,
}

fn parse_stream_line(line: &str, model: &str) -> Result<StreamLine, ChatError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(StreamLine::Empty);
    }

    let chunk: GenerateResponse = serde_json::from_str(line)
        .map_err(|e| ChatError::Backend(format!("Malformed stream chunk: {}", e)))?;

    if let Some(error) = chunk.error {
        return Err(map_error_message(&error, model));
    }

    match chunk.response {
        Some(text) if !text.is_empty() => Ok(StreamLine::Fragment(text)),
        _ if chunk.done => Ok(StreamLine::Done),
        _ => Ok(StreamLine::Empty),
    }
}

fn map_status_error(status: StatusCode, body: &str, model: &str) -> ChatError {
    let message = serde_json::from_str::<GenerateResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .unwrap_or_else(|| body.trim().to_string());

    if status == StatusCode::NOT_FOUND || is_missing_model(&message) {
        ChatError::ModelNotFound(model.to_string())
    } else if message.is_empty() {
        ChatError::Backend(format!("Ollama returned {}", status))
    } else {
        ChatError::Backend(message)
    }
}

fn map_error_message(message: &str, model: &str) -> ChatError {
    if is_missing_model(message) {
        ChatError::ModelNotFound(model.to_string())
    } else {
        ChatError::Backend(message.to_string())
    }
}

fn is_missing_model(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("model") && lower.contains("not found")
}

// Response structure for /api/generate, shared by the batch reply and each stream line
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}
