use crate::constants::SUGGESTED_MODEL;
use crate::utils::ChatError;

/// OS-specific instructions for installing Ollama
pub fn install_instructions() -> Vec<String> {
    let mut lines = vec!["To chat with local models, install Ollama:".to_string()];

    #[cfg(target_os = "macos")]
    {
        lines.push("[INSTALL] macOS: brew install ollama".to_string());
        lines.push("[DOWNLOAD] https://ollama.com/download/mac".to_string());
    }

    #[cfg(target_os = "linux")]
    {
        lines.push("[INSTALL] Linux: curl -fsSL https://ollama.com/install.sh | sh".to_string());
        lines.push("[DOWNLOAD] https://ollama.com/download/linux".to_string());
    }

    #[cfg(target_os = "windows")]
    {
        lines.push("[DOWNLOAD] Windows: https://ollama.com/download/windows".to_string());
    }

    lines.push("Then start the server with: ollama serve".to_string());
    lines
}

/// Message shown when the server is installed but not answering
pub fn not_running_message() -> String {
    "Ollama is not running. Please run \"ollama serve\" first.".to_string()
}

/// Message shown when discovery succeeded but found nothing
pub fn no_models_message() -> String {
    format!(
        "No models found. Please run \"ollama pull {}\" to download a model.",
        SUGGESTED_MODEL
    )
}

/// Human explanation for a discovery failure, with install steps when relevant
pub fn explain(error: &ChatError) -> Vec<String> {
    let mut lines = vec![error.to_string()];
    if let Some(hint) = error.hint() {
        lines.push(hint);
    }
    if matches!(error, ChatError::Discovery(reason) if reason == crate::constants::NOT_INSTALLED_REASON) {
        lines.extend(install_instructions());
    }
    lines
}
