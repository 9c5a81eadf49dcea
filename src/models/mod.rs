// Gateway module for models - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod backend;
mod factory;
mod native;
mod simulated;
mod traits;
mod types;

#[cfg(test)]
pub(crate) mod stub;

// Public re-exports - the ONLY way to access model functionality
pub use backend::{InferenceBackend, OllamaClient};
pub use factory::ProviderFactory;
pub use native::NativeStreamProvider;
pub use simulated::SimulatedStreamProvider;
pub use traits::ModelProvider;
pub use types::{
    qualify_model, unqualify_model, ChunkSender, ChunkStream, GenerateOptions, GenerateRequest,
    ModelPolicy, ProviderSettings, StreamMode,
};
