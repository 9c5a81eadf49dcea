use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_MAX_TOKENS, DEFAULT_OLLAMA_BINARY, DEFAULT_OLLAMA_HOST, DEFAULT_OLLAMA_PORT,
    DEFAULT_TEMPERATURE, SIMULATED_CHUNK_DELAY_MS,
};
use crate::models::{GenerateOptions, ModelPolicy, StreamMode};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Where the Ollama server and CLI live
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Model selection and generation parameters
    #[serde(default)]
    pub model: ModelSettings,

    /// How replies are streamed
    #[serde(default)]
    pub stream: StreamSettings,
}

impl Config {
    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            temperature: self.model.temperature,
            max_tokens: self.model.max_tokens,
        }
    }
}

/// Ollama configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Ollama server host
    pub host: String,
    /// Ollama server port
    pub port: u16,
    /// Name or path of the ollama executable
    pub binary: String,
    /// Start `ollama serve` when the server is installed but down
    pub auto_start: bool,
}

impl OllamaConfig {
    /// Base URL of the HTTP API
    pub fn server_address(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_OLLAMA_HOST.to_string(),
            port: DEFAULT_OLLAMA_PORT,
            binary: DEFAULT_OLLAMA_BINARY.to_string(),
            auto_start: false,
        }
    }
}

/// Model settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Model to start with
    pub default: Option<String>,
    /// Models to offer; empty means whatever `ollama list` reports
    pub models: Vec<String>,
    /// What to do when no model has been chosen
    pub policy: ModelPolicy,
    /// Temperature for generation
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            default: None,
            models: Vec::new(),
            policy: ModelPolicy::default(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Streaming configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSettings {
    pub mode: StreamMode,
    /// Pause between characters for simulated streaming
    pub chunk_delay_ms: u64,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            mode: StreamMode::default(),
            chunk_delay_ms: SIMULATED_CHUNK_DELAY_MS,
        }
    }
}

/// Load configuration from multiple sources.
///
/// With `explicit` set, that file replaces the global and project files.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let files = match explicit {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            vec![path.to_path_buf()]
        }
        None => vec![
            get_config_dir()?.join("config.toml"),
            PathBuf::from(".dmitry/config.toml"),
        ],
    };

    load_config_from(&files)
}

/// Layer defaults, the given TOML files (later wins) and `DMITRY_` env vars
pub fn load_config_from(files: &[PathBuf]) -> Result<Config> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    for file in files.iter().filter(|f| f.exists()) {
        figment = figment.merge(Toml::file(file));
    }

    // DMITRY_MODEL__DEFAULT=llama3.2 -> model.default
    figment = figment.merge(Env::prefixed("DMITRY_").split("__"));

    figment
        .extract()
        .context("Failed to load configuration")
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "dmitry") {
        let config_dir = proj_dirs.config_dir();
        std::fs::create_dir_all(config_dir)?;
        Ok(config_dir.to_path_buf())
    } else {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        let config_dir = PathBuf::from(home).join(".config").join("dmitry");
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = if let Some(p) = path {
        p
    } else {
        get_config_dir()?.join("config.toml")
    };

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Write a default configuration file into the config directory.
///
/// Returns the file path and whether it was newly created.
pub fn init_config() -> Result<(PathBuf, bool)> {
    init_config_in(&get_config_dir()?)
}

fn init_config_in(dir: &Path) -> Result<(PathBuf, bool)> {
    let config_file = dir.join("config.toml");
    if config_file.exists() {
        return Ok((config_file, false));
    }

    std::fs::create_dir_all(dir)?;
    save_config(&Config::default(), Some(config_file.clone()))?;
    Ok((config_file, true))
}
