use anyhow::Result;
use tracing::{info, warn};

use crate::{
    app::{get_config_dir, load_config, Config},
    cli::{handle_command, Cli, Commands},
    constants::NOT_INSTALLED_REASON,
    models::{ProviderFactory, StreamMode},
    ollama::{
        explain, no_models_message, not_running_message, resolve_model, ModelDescriptor,
        ModelDiscoveryService,
    },
    session::SessionEngine,
    tui::{run_ui, ModelSelector, SelectorOutcome, TerminalSession},
    utils::{init_file_logger, init_logger, ChatError},
};

/// What startup discovery found
#[derive(Debug, Default)]
struct StartupDiscovery {
    installed: bool,
    models: Vec<ModelDescriptor>,
    /// Lines explaining why there is nothing to choose from
    notices: Vec<String>,
}

/// Main runtime orchestrator
pub struct Orchestrator {
    cli: Cli,
    config: Config,
}

impl Orchestrator {
    /// Create a new orchestrator from CLI args
    pub fn new(cli: Cli) -> Result<Self> {
        let mut config = load_config(cli.config.as_deref())?;
        if cli.simulate_stream {
            config.stream.mode = StreamMode::Simulated;
        }
        Ok(Self { cli, config })
    }

    /// Run the orchestrator
    pub async fn run(self) -> Result<()> {
        // The chat screen owns the terminal, so it logs to a file instead
        if matches!(self.cli.command, None | Some(Commands::Chat)) {
            init_file_logger(self.cli.verbose, &get_config_dir()?.join("dmitry.log"))?;
        } else {
            init_logger(self.cli.verbose)?;
        }

        if let Some(command) = self.cli.command {
            if handle_command(command, &self.config).await? {
                return Ok(());
            }
        }

        self.run_chat().await
    }

    async fn run_chat(&self) -> Result<()> {
        let discovery = ModelDiscoveryService::system(&self.config.ollama.binary);
        let found = self.discover(&discovery).await;

        let mut session = TerminalSession::enter()?;

        let requested = self
            .cli
            .model
            .clone()
            .or_else(|| self.config.model.default.clone());
        let model = match requested {
            Some(model) => Some(model),
            None if found.installed => {
                let selector = if found.models.is_empty() {
                    ModelSelector::with_notice(found.notices.clone())
                } else {
                    ModelSelector::new(found.models.clone())
                };
                match selector.run(&mut session).await? {
                    SelectorOutcome::Selected(model) => Some(model),
                    SelectorOutcome::Skipped => None,
                    SelectorOutcome::Quit => return Ok(()),
                }
            }
            None => None,
        };
        // "llama3.2" is what Ollama itself runs as "llama3.2:latest"
        let installed = model
            .as_deref()
            .and_then(|m| resolve_model(&found.models, m))
            .map(|m| m.full_name.clone());
        let model = if self.config.model.models.is_empty() {
            installed.clone().or(model)
        } else {
            model
        };
        info!(model = ?model, "starting chat session");

        let names: Vec<String> = found.models.iter().map(|m| m.full_name.clone()).collect();
        let provider = ProviderFactory::from_config(&self.config, names.clone(), model.clone())?;
        let mut engine = SessionEngine::new(provider, self.config.generate_options())
            .with_discovery(discovery);

        for notice in &found.notices {
            engine.notify(notice.clone());
        }
        match &model {
            Some(model) if !names.is_empty() && installed.is_none() => {
                warn!(%model, "requested model is not installed");
                engine.notify(format!(
                    "Model {} is not in the installed list. Run \"ollama pull {}\" or pick one with /model.",
                    model, model
                ));
            }
            Some(model) => engine.notify(format!("Using model: {}", model)),
            None => {}
        }

        run_ui(&mut engine, &mut session).await
    }

    /// Probe the local runtime once for liveness and installed models
    async fn discover(&self, discovery: &ModelDiscoveryService) -> StartupDiscovery {
        if !discovery.is_installed() {
            return StartupDiscovery {
                notices: explain(&ChatError::Discovery(NOT_INSTALLED_REASON.to_string())),
                ..StartupDiscovery::default()
            };
        }

        let mut running = discovery.is_running().await;
        if running == Ok(false) && self.config.ollama.auto_start {
            match discovery.start_service().await {
                Ok(()) => running = discovery.is_running().await,
                Err(e) => warn!(error = %e, "could not start ollama"),
            }
        }

        let mut found = StartupDiscovery {
            installed: true,
            ..StartupDiscovery::default()
        };
        match running {
            Ok(true) => match discovery.installed_models().await {
                Ok(models) if models.is_empty() => found.notices.push(no_models_message()),
                Ok(models) => found.models = models,
                Err(e) => found.notices = explain(&e),
            },
            Ok(false) => found.notices.push(not_running_message()),
            Err(e) => found.notices = explain(&e),
        }
        found
    }
}
