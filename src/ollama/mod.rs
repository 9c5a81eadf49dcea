/// Ollama integration module - Gateway
mod discovery;
mod guide;
mod runner;

pub use discovery::{parse_model_list, resolve_model, ModelDescriptor, ModelDiscoveryService};
pub use guide::{explain, install_instructions, no_models_message, not_running_message};
pub use runner::{ProcessOutput, ProcessRunner, SystemRunner};

#[cfg(test)]
pub(crate) use runner::stub::StubRunner;
