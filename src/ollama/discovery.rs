use serde::Serialize;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::runner::{ProcessOutput, ProcessRunner, SystemRunner};
use crate::constants::{
    COMMAND_NOT_FOUND_SIGNATURE, DEFAULT_OLLAMA_BINARY, NOT_INSTALLED_REASON,
    NOT_RUNNING_SIGNATURE, SERVICE_STARTUP_WAIT_SECS, SIZE_UNITS,
};
use crate::utils::ChatError;

/// A model installed in the local runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelDescriptor {
    /// Name without the version tag ("llama3.2")
    pub name: String,
    /// Name as listed, tag included ("llama3.2:latest")
    pub full_name: String,
    pub size: String,
    pub modified: String,
}

/// The installed model `requested` refers to.
///
/// A bare name matches its `:latest` tag, the same way Ollama resolves it.
pub fn resolve_model<'a>(models: &'a [ModelDescriptor], requested: &str) -> Option<&'a ModelDescriptor> {
    models
        .iter()
        .find(|m| m.full_name == requested)
        .or_else(|| {
            models
                .iter()
                .find(|m| m.name == requested && m.full_name == format!("{}:latest", requested))
        })
}

/// Asks the Ollama CLI which models are installed and whether the server is up
pub struct ModelDiscoveryService {
    runner: Arc<dyn ProcessRunner>,
    binary: String,
}

impl ModelDiscoveryService {
    pub fn new(runner: Arc<dyn ProcessRunner>, binary: impl Into<String>) -> Self {
        Self {
            runner,
            binary: binary.into(),
        }
    }

    /// Discovery backed by real processes
    pub fn system(binary: impl Into<String>) -> Self {
        Self::new(Arc::new(SystemRunner), binary)
    }

    /// Whether the binary can be found on PATH
    pub fn is_installed(&self) -> bool {
        which::which(&self.binary).is_ok()
    }

    /// Liveness probe (`ollama ps`). A refused connection means the server is
    /// down, which is an answer rather than an error.
    pub async fn is_running(&self) -> Result<bool, ChatError> {
        let output = self.probe("ps").await?;
        if output.success {
            return Ok(true);
        }

        let message = failure_message(&output);
        if message.to_lowercase().contains(NOT_RUNNING_SIGNATURE) {
            debug!("ollama server is not running");
            return Ok(false);
        }
        if is_not_installed(&message) {
            return Err(ChatError::Discovery(NOT_INSTALLED_REASON.to_string()));
        }

        Err(ChatError::Discovery(message))
    }

    /// Listing probe (`ollama list`), parsed into descriptors.
    /// Each call runs the probe again.
    pub async fn installed_models(&self) -> Result<Vec<ModelDescriptor>, ChatError> {
        let output = self.probe("list").await?;
        if !output.success {
            let message = failure_message(&output);
            if is_not_installed(&message) {
                return Err(ChatError::Discovery(NOT_INSTALLED_REASON.to_string()));
            }
            return Err(ChatError::Discovery(format!(
                "Failed to get Ollama models: {}",
                message
            )));
        }

        let models = parse_model_list(&output.stdout);
        info!(count = models.len(), "discovered installed models");
        Ok(models)
    }

    /// Start `ollama serve` in the background and give it a moment to bind
    pub async fn start_service(&self) -> Result<(), ChatError> {
        self.runner
            .spawn_detached(&self.binary, &["serve"])
            .map_err(|e| map_spawn_error(&e))?;

        info!("started ollama server, waiting for it to come up");
        tokio::time::sleep(Duration::from_secs(SERVICE_STARTUP_WAIT_SECS)).await;
        Ok(())
    }

    async fn probe(&self, subcommand: &str) -> Result<ProcessOutput, ChatError> {
        debug!(binary = %self.binary, subcommand, "running discovery probe");
        self.runner
            .run(&self.binary, &[subcommand])
            .await
            .map_err(|e| map_spawn_error(&e))
    }
}

impl Default for ModelDiscoveryService {
    fn default() -> Self {
        Self::system(DEFAULT_OLLAMA_BINARY)
    }
}

fn map_spawn_error(error: &io::Error) -> ChatError {
    if error.kind() == io::ErrorKind::NotFound {
        ChatError::Discovery(NOT_INSTALLED_REASON.to_string())
    } else {
        warn!(%error, "discovery probe failed to run");
        ChatError::Discovery(error.to_string())
    }
}

fn failure_message(output: &ProcessOutput) -> String {
    let stderr = output.stderr.trim();
    if stderr.is_empty() {
        output.stdout.trim().to_string()
    } else {
        stderr.to_string()
    }
}

fn is_not_installed(message: &str) -> bool {
    message.to_lowercase().contains(COMMAND_NOT_FOUND_SIGNATURE)
}

/// Parse `ollama list` output.
///
/// The first line is the header; every other non-blank line is
/// `NAME ID SIZE MODIFIED...` separated by runs of whitespace.
pub fn parse_model_list(stdout: &str) -> Vec<ModelDescriptor> {
    stdout
        .lines()
        .skip(1)
        .filter_map(parse_model_line)
        .collect()
}

fn parse_model_line(line: &str) -> Option<ModelDescriptor> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let full_name = *parts.first()?;
    let name = full_name.split(':').next().unwrap_or(full_name);

    // Newer runtimes print SIZE as "2.0 GB"
    let (size, modified_from) = match (parts.get(2), parts.get(3)) {
        (Some(amount), Some(unit)) if SIZE_UNITS.contains(unit) => {
            (format!("{} {}", amount, unit), 4)
        }
        (Some(size), _) => (size.to_string(), 3),
        (None, _) => ("unknown".to_string(), 3),
    };

    let modified = parts.get(modified_from..).unwrap_or_default().join(" ");

    Some(ModelDescriptor {
        name: name.to_string(),
        full_name: full_name.to_string(),
        size,
        modified: if modified.is_empty() {
            "unknown".to_string()
        } else {
            modified
        },
    })
}
