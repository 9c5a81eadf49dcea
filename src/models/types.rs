use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::constants::{
    BACKEND_PREFIX, DEFAULT_MAX_TOKENS, DEFAULT_OLLAMA_HOST, DEFAULT_OLLAMA_PORT,
    DEFAULT_TEMPERATURE, SIMULATED_CHUNK_DELAY_MS,
};
use crate::utils::ChatError;

/// Generation parameters recognized by every backend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// How the session should behave when no model has been chosen explicitly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelPolicy {
    /// Refuse to generate until a model is selected
    #[default]
    Explicit,
    /// Fall back to the first available model
    ImplicitDefault,
}

/// Which streaming strategy a provider uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StreamMode {
    /// Pick based on what the backend supports
    #[default]
    Auto,
    /// Forward the backend's own incremental output
    Native,
    /// Generate the whole reply, then replay it one character at a time
    Simulated,
}

/// Everything a provider needs to talk to its backend.
///
/// Switching models replaces this value wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    /// Base URL of the inference server
    pub server_address: String,
    /// Models known to this configuration; empty means "only the current one"
    pub models: Vec<String>,
    /// `models` comes from configuration and discovery must not replace it
    pub models_pinned: bool,
    /// Explicitly selected model
    pub current_model: Option<String>,
    pub policy: ModelPolicy,
    /// Pause between characters when replaying a batch response
    pub chunk_delay: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            server_address: format!("http://{}:{}", DEFAULT_OLLAMA_HOST, DEFAULT_OLLAMA_PORT),
            models: Vec::new(),
            models_pinned: false,
            current_model: None,
            policy: ModelPolicy::default(),
            chunk_delay: Duration::from_millis(SIMULATED_CHUNK_DELAY_MS),
        }
    }
}

impl ProviderSettings {
    pub fn new(server_address: impl Into<String>) -> Self {
        Self {
            server_address: server_address.into(),
            ..Self::default()
        }
    }

    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = models.into_iter().map(Into::into).collect();
        self
    }

    /// Keep `models` fixed across rediscovery
    pub fn pin_models(mut self) -> Self {
        self.models_pinned = true;
        self
    }

    /// Settings with the model list swapped for freshly discovered names.
    /// `None` when the list is pinned or already up to date.
    pub fn rediscovered(&self, models: Vec<String>) -> Option<Self> {
        if self.models_pinned || self.models == models {
            return None;
        }
        Some(Self {
            models,
            ..self.clone()
        })
    }

    pub fn with_current_model(mut self, model: impl Into<String>) -> Self {
        self.current_model = Some(model.into());
        self
    }

    pub fn with_policy(mut self, policy: ModelPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    /// Model names known to this configuration
    pub fn available_models(&self) -> Vec<String> {
        if self.models.is_empty() {
            self.current_model.iter().cloned().collect()
        } else {
            self.models.clone()
        }
    }

    /// The model requests go to, after applying the selection policy
    pub fn effective_model(&self) -> Option<String> {
        match (&self.current_model, self.policy) {
            (Some(model), _) => Some(model.clone()),
            (None, ModelPolicy::ImplicitDefault) => self.models.first().cloned(),
            (None, ModelPolicy::Explicit) => None,
        }
    }
}

/// A single generation call as seen by a backend
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    /// Backend-qualified identifier, e.g. "ollama/llama3.2"
    pub model: String,
    pub prompt: String,
    pub options: GenerateOptions,
}

impl GenerateRequest {
    pub fn new(model: &str, prompt: impl Into<String>, options: GenerateOptions) -> Self {
        Self {
            model: qualify_model(model),
            prompt: prompt.into(),
            options,
        }
    }

    /// Model name without the backend prefix
    pub fn model_name(&self) -> &str {
        unqualify_model(&self.model)
    }
}

/// "llama3.2" -> "ollama/llama3.2"
pub fn qualify_model(model: &str) -> String {
    if model.starts_with(&format!("{}/", BACKEND_PREFIX)) {
        model.to_string()
    } else {
        format!("{}/{}", BACKEND_PREFIX, model)
    }
}

/// "ollama/llama3.2" -> "llama3.2"
pub fn unqualify_model(model: &str) -> &str {
    model
        .strip_prefix(BACKEND_PREFIX)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(model)
}

/// Sending half of a response stream
pub type ChunkSender = mpsc::Sender<Result<String, ChatError>>;

/// Lazy, finite sequence of response chunks; ends when the producer drops its sender
pub type ChunkStream = ReceiverStream<Result<String, ChatError>>;
