/// Constants module to avoid magic numbers in the codebase

// Network Configuration
pub const DEFAULT_OLLAMA_HOST: &str = "127.0.0.1";
pub const DEFAULT_OLLAMA_PORT: u16 = 11434;
pub const DEFAULT_OLLAMA_BINARY: &str = "ollama";
/// Prefix used when addressing a model through the inference backend ("ollama/llama3.2")
pub const BACKEND_PREFIX: &str = "ollama";

// Timeouts
pub const COMMAND_TIMEOUT_SECS: u64 = 30;
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 600; // 10 minutes for large model requests
pub const HEALTH_CHECK_TIMEOUT_MS: u64 = 500;
pub const SERVICE_STARTUP_WAIT_SECS: u64 = 2;

// Generation defaults
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;
pub const SIMULATED_CHUNK_DELAY_MS: u64 = 10;
pub const STREAM_CHANNEL_CAPACITY: usize = 100;

// Discovery output signatures
pub const NOT_RUNNING_SIGNATURE: &str = "could not connect";
pub const COMMAND_NOT_FOUND_SIGNATURE: &str = "command not found";
pub const NOT_INSTALLED_REASON: &str = "not installed";
pub const SUGGESTED_MODEL: &str = "llama3.2";

// Size units printed by `ollama list` when SIZE is split into two columns
pub const SIZE_UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
