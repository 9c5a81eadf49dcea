use anyhow::Result;
use colored::Colorize;

use crate::{
    app::{get_config_dir, init_config, Config},
    models::{InferenceBackend, OllamaClient},
    ollama::{explain, no_models_message, ModelDiscoveryService},
};

use super::Commands;

/// Handle CLI subcommands. Returns `false` when the chat session should start.
pub async fn handle_command(command: Commands, config: &Config) -> Result<bool> {
    match command {
        Commands::Init => {
            println!("Initializing dmitry configuration...");
            let (path, created) = init_config()?;
            if created {
                println!("  {} Created default configuration at: {}", "[OK]".green(), path.display());
            } else {
                println!("  {} Configuration already exists at: {}", "[OK]".green(), path.display());
            }
            Ok(true)
        }
        Commands::List => {
            list_models(config).await?;
            Ok(true)
        }
        Commands::Version => {
            show_version();
            Ok(true)
        }
        Commands::Status => {
            show_status(config).await?;
            Ok(true)
        }
        Commands::Chat => Ok(false),
    }
}

/// List installed models
pub async fn list_models(config: &Config) -> Result<()> {
    let discovery = ModelDiscoveryService::system(&config.ollama.binary);
    match discovery.installed_models().await {
        Ok(models) if models.is_empty() => println!("{}", no_models_message().yellow()),
        Ok(models) => {
            println!("Installed models:");
            for model in models {
                println!(
                    "  • {} {}",
                    model.full_name.green(),
                    format!("({}, modified {})", model.size, model.modified).dimmed()
                );
            }
        }
        Err(e) => {
            for line in explain(&e) {
                println!("{}", line.red());
            }
        }
    }
    Ok(())
}

/// Show version information
pub fn show_version() {
    println!("dmitry v{}", env!("CARGO_PKG_VERSION"));
    println!("   Chat with locally hosted Ollama models from your terminal");
}

/// Show the state of Ollama and the configuration
pub async fn show_status(config: &Config) -> Result<()> {
    println!("dmitry Status:");
    println!();

    let discovery = ModelDiscoveryService::system(&config.ollama.binary);
    if !discovery.is_installed() {
        println!("  {} Ollama: Not installed", "[ERROR]".red());
    } else {
        match discovery.is_running().await {
            Ok(true) => match discovery.installed_models().await {
                Ok(models) if models.is_empty() => {
                    println!("  {} Ollama: Running (no models)", "[WARNING]".yellow());
                }
                Ok(models) => {
                    println!(
                        "  {} Ollama: Running ({} models installed)",
                        "[OK]".green(),
                        models.len()
                    );
                    for model in models.iter().take(3) {
                        println!("      • {}", model.full_name);
                    }
                    if models.len() > 3 {
                        println!("      ... and {} more", models.len() - 3);
                    }
                }
                Err(e) => println!("  {} Ollama: {}", "[ERROR]".red(), e),
            },
            Ok(false) => println!("  {} Ollama: Installed but not running", "[WARNING]".yellow()),
            Err(e) => println!("  {} Ollama: {}", "[ERROR]".red(), e),
        }
    }

    let address = config.ollama.server_address();
    let reachable = match OllamaClient::new(&address) {
        Ok(client) => client.is_reachable().await,
        Err(_) => false,
    };
    if reachable {
        println!("  {} API: Reachable at {}", "[OK]".green(), address);
    } else {
        println!("  {} API: Not reachable at {}", "[ERROR]".red(), address);
    }

    let config_path = get_config_dir()?.join("config.toml");
    if config_path.exists() {
        println!("  {} Configuration: {}", "[OK]".green(), config_path.display());
    } else {
        println!("  {} Configuration: Not found (using defaults)", "[WARNING]".yellow());
    }

    match &config.model.default {
        Some(model) => println!("  {} Default model: {}", "[OK]".green(), model),
        None => println!("  {} Default model: none (you will be asked)", "[WARNING]".yellow()),
    }

    println!();
    Ok(())
}
