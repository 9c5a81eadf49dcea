pub mod app;
pub mod cli;
pub mod constants;
pub mod models;
pub mod ollama;
pub mod runtime;
pub mod session;
pub mod tui;
pub mod utils;

pub use app::{load_config, Config};
pub use models::{ModelProvider, ProviderFactory};
pub use session::SessionEngine;
pub use tui::run_ui;
pub use utils::ChatError;
