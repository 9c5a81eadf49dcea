use tracing::debug;

use super::state::SessionContext;
use crate::models::ModelProvider;
use crate::ollama::{no_models_message, resolve_model, ModelDescriptor, ModelDiscoveryService};
use crate::utils::ChatError;

pub const HELP_TEXT: &str = "\
Available commands:
  /model          Show the current model and the installed models
  /model <name>   Switch to another installed model
  /help           Show this help
Anything else is sent to the model. Press Ctrl+C to exit.";

/// What a submitted line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Chat(String),
    ShowModelInfo,
    SwitchModel(String),
    ShowHelp,
    UnknownCommand(String),
}

/// Classifies submitted lines and carries out the resulting commands
pub struct CommandRouter;

impl CommandRouter {
    /// Classify a submitted line. Never fails.
    pub fn route(line: &str) -> Action {
        let Some(command) = line.strip_prefix('/') else {
            return Action::Chat(line.to_string());
        };

        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        match (name, args.as_slice()) {
            ("model", []) => Action::ShowModelInfo,
            ("model", [model]) => Action::SwitchModel(model.to_string()),
            ("help", []) => Action::ShowHelp,
            _ => Action::UnknownCommand(name.to_string()),
        }
    }

    /// Carry out a command action against the session.
    ///
    /// Failures are recorded in the log; the session stays usable either way.
    /// `Chat` is not a command and is ignored here.
    pub async fn dispatch(
        action: Action,
        ctx: &mut SessionContext,
        provider: &mut dyn ModelProvider,
        discovery: Option<&ModelDiscoveryService>,
    ) {
        debug!(?action, "dispatching command");
        match action {
            Action::Chat(_) => {}
            Action::ShowHelp => ctx.info(HELP_TEXT),
            Action::UnknownCommand(name) => ctx.record_error(ChatError::UnknownCommand(name)),
            Action::SwitchModel(requested) => {
                let name = match discovery {
                    Some(discovery) => Self::rediscover(provider, discovery, requested).await,
                    None => requested,
                };
                match provider.switch_model(&name) {
                    Ok(()) => {
                        ctx.state.current_model = Some(name.clone());
                        ctx.info(format!("Switched to model: {}", name));
                    }
                    Err(e) => ctx.record_error(e),
                }
            }
            Action::ShowModelInfo => Self::show_model_info(ctx, provider, discovery).await,
        }
    }

    /// Refresh the provider's models before switching and resolve a bare
    /// name to the installed tag it stands for. On a failed probe the known
    /// models stay as they are.
    async fn rediscover(
        provider: &mut dyn ModelProvider,
        discovery: &ModelDiscoveryService,
        requested: String,
    ) -> String {
        match discovery.installed_models().await {
            Ok(models) => {
                Self::refresh_models(provider, &models);
                if provider.settings().models_pinned {
                    return requested;
                }
                resolve_model(&models, &requested)
                    .map(|m| m.full_name.clone())
                    .unwrap_or(requested)
            }
            Err(e) => {
                debug!(error = %e, "rediscovery failed, keeping known models");
                requested
            }
        }
    }

    fn refresh_models(provider: &mut dyn ModelProvider, models: &[ModelDescriptor]) {
        let names = models.iter().map(|m| m.full_name.clone()).collect();
        if let Some(settings) = provider.settings().rediscovered(names) {
            debug!(count = models.len(), "refreshed available models");
            provider.reinitialize(settings);
        }
    }

    async fn show_model_info(
        ctx: &mut SessionContext,
        provider: &mut dyn ModelProvider,
        discovery: Option<&ModelDiscoveryService>,
    ) {
        let current = provider
            .current_model()
            .unwrap_or_else(|| "none".to_string());
        let mut lines = vec![format!("Current model: {}", current)];

        match discovery {
            Some(discovery) => match discovery.installed_models().await {
                Ok(models) => {
                    Self::refresh_models(provider, &models);
                    if models.is_empty() {
                        lines.push(no_models_message());
                    } else {
                        lines.push("Installed models:".to_string());
                        lines.extend(
                            models
                                .iter()
                                .map(|m| format!("  {} ({}, modified {})", m.full_name, m.size, m.modified)),
                        );
                    }
                }
                Err(e) => {
                    ctx.record_error_with_context(lines.join("\n"), e);
                    return;
                }
            },
            None => {
                let available = provider.available_models();
                if available.is_empty() {
                    lines.push("Available models: none".to_string());
                } else {
                    lines.push(format!("Available models: {}", available.join(", ")));
                }
            }
        }

        ctx.info(lines.join("\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::stub::StubBackend;
    use crate::models::{NativeStreamProvider, ProviderSettings};
    use crate::ollama::StubRunner;
    use crate::session::MessageKind;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn provider() -> NativeStreamProvider {
        let settings = ProviderSettings::new("http://127.0.0.1:11434")
            .with_models(["llama3.2", "gemma2"])
            .with_current_model("llama3.2");
        NativeStreamProvider::new(Arc::new(StubBackend::replying("ok")), settings)
    }

    #[test]
    fn test_route_examples() {
        assert_eq!(CommandRouter::route("/model"), Action::ShowModelInfo);
        assert_eq!(
            CommandRouter::route("/model gemma2"),
            Action::SwitchModel("gemma2".to_string())
        );
        assert_eq!(CommandRouter::route("hello"), Action::Chat("hello".to_string()));
        assert_eq!(
            CommandRouter::route("/frobnicate"),
            Action::UnknownCommand("frobnicate".to_string())
        );
        assert_eq!(CommandRouter::route("/help"), Action::ShowHelp);
    }

    #[test]
    fn test_route_malformed_commands() {
        assert_eq!(CommandRouter::route("/"), Action::UnknownCommand(String::new()));
        assert_eq!(
            CommandRouter::route("/model a b"),
            Action::UnknownCommand("model".to_string())
        );
        assert_eq!(
            CommandRouter::route("/help me"),
            Action::UnknownCommand("help".to_string())
        );
    }

    #[test]
    fn test_route_keeps_chat_text_verbatim() {
        assert_eq!(
            CommandRouter::route("  what is /model?  "),
            Action::Chat("  what is /model?  ".to_string())
        );
    }

    #[tokio::test]
    async fn test_switch_model_success() {
        let mut ctx = SessionContext::new(Some("llama3.2".to_string()));
        let mut provider = provider();

        CommandRouter::dispatch(Action::SwitchModel("gemma2".to_string()), &mut ctx, &mut provider, None).await;

        assert_eq!(ctx.state.current_model.as_deref(), Some("gemma2"));
        assert_eq!(provider.current_model().as_deref(), Some("gemma2"));
        assert_eq!(ctx.log.messages()[0].content(), "Switched to model: gemma2");
    }

    #[tokio::test]
    async fn test_switch_model_rejects_unknown() {
        let mut ctx = SessionContext::new(Some("llama3.2".to_string()));
        let mut provider = provider();

        CommandRouter::dispatch(Action::SwitchModel("phi3".to_string()), &mut ctx, &mut provider, None).await;

        assert_eq!(ctx.state.current_model.as_deref(), Some("llama3.2"));
        assert_eq!(provider.current_model().as_deref(), Some("llama3.2"));
        assert_eq!(ctx.log.len(), 1);
        assert_eq!(ctx.log.messages()[0].kind(), MessageKind::Error);
        assert_eq!(
            ctx.log.messages()[0].content(),
            "Model phi3 not available. Available models: llama3.2, gemma2"
        );
    }

    #[tokio::test]
    async fn test_unknown_command_is_informational() {
        let mut ctx = SessionContext::new(None);
        let mut provider = provider();

        CommandRouter::dispatch(
            Action::UnknownCommand("frobnicate".to_string()),
            &mut ctx,
            &mut provider,
            None,
        )
        .await;

        assert_eq!(ctx.log.messages()[0].kind(), MessageKind::Info);
        assert!(ctx.log.messages()[0].content().contains("/frobnicate"));
    }

    #[tokio::test]
    async fn test_show_model_info_uses_discovery() {
        let runner = StubRunner::new().succeeding(
            "list",
            "NAME ID SIZE MODIFIED\nllama3.2:latest abc123 2.0GB 3 days ago\n",
        );
        let discovery = ModelDiscoveryService::new(Arc::new(runner), "ollama");
        let mut ctx = SessionContext::new(Some("llama3.2".to_string()));
        let mut provider = provider();

        CommandRouter::dispatch(Action::ShowModelInfo, &mut ctx, &mut provider, Some(&discovery)).await;

        assert_eq!(
            ctx.log.messages()[0].content(),
            "Current model: llama3.2\nInstalled models:\n  llama3.2:latest (2.0GB, modified 3 days ago)"
        );
    }

    #[tokio::test]
    async fn test_show_model_info_discovery_failure() {
        let runner = StubRunner::new().failing("list", "Error: boom");
        let discovery = ModelDiscoveryService::new(Arc::new(runner), "ollama");
        let mut ctx = SessionContext::new(Some("llama3.2".to_string()));
        let mut provider = provider();

        CommandRouter::dispatch(Action::ShowModelInfo, &mut ctx, &mut provider, Some(&discovery)).await;

        assert_eq!(ctx.log.len(), 1);
        let entry = &ctx.log.messages()[0];
        assert_eq!(entry.kind(), MessageKind::Error);
        assert!(entry.content().starts_with("Current model: llama3.2\n"));
        assert!(entry.content().contains("boom"));
        assert!(matches!(
            ctx.state.last_error.as_ref().map(|e| &e.error),
            Some(ChatError::Discovery(_))
        ));
    }

    #[tokio::test]
    async fn test_show_model_info_refreshes_available_models() {
        let runner = StubRunner::new().succeeding(
            "list",
            "NAME ID SIZE MODIFIED\nllama3.2:latest abc123 2.0GB 3 days ago\nphi3:mini def456 2.2GB now\n",
        );
        let discovery = ModelDiscoveryService::new(Arc::new(runner), "ollama");
        let mut ctx = SessionContext::new(Some("llama3.2".to_string()));
        let mut provider = provider();

        CommandRouter::dispatch(Action::ShowModelInfo, &mut ctx, &mut provider, Some(&discovery)).await;

        assert_eq!(
            provider.available_models(),
            vec!["llama3.2:latest".to_string(), "phi3:mini".to_string()]
        );
        assert_eq!(provider.current_model().as_deref(), Some("llama3.2"));
    }

    #[tokio::test]
    async fn test_switch_resolves_bare_name_against_discovery() {
        let runner = StubRunner::new().succeeding(
            "list",
            "NAME ID SIZE MODIFIED\nllama3.2:latest abc123 2.0GB 3 days ago\n",
        );
        let discovery = ModelDiscoveryService::new(Arc::new(runner), "ollama");
        let mut ctx = SessionContext::new(None);
        let mut provider = NativeStreamProvider::new(
            Arc::new(StubBackend::replying("ok")),
            ProviderSettings::default(),
        );

        CommandRouter::dispatch(
            Action::SwitchModel("llama3.2".to_string()),
            &mut ctx,
            &mut provider,
            Some(&discovery),
        )
        .await;

        assert_eq!(ctx.state.current_model.as_deref(), Some("llama3.2:latest"));
        assert_eq!(ctx.log.messages()[0].content(), "Switched to model: llama3.2:latest");
    }

    #[tokio::test]
    async fn test_pinned_models_survive_rediscovery() {
        let runner = StubRunner::new().succeeding(
            "list",
            "NAME ID SIZE MODIFIED\nphi3:mini def456 2.2GB now\n",
        );
        let discovery = ModelDiscoveryService::new(Arc::new(runner), "ollama");
        let settings = ProviderSettings::default()
            .with_models(["llama3.2", "gemma2"])
            .with_current_model("llama3.2")
            .pin_models();
        let mut provider = NativeStreamProvider::new(Arc::new(StubBackend::replying("ok")), settings);
        let mut ctx = SessionContext::new(Some("llama3.2".to_string()));

        CommandRouter::dispatch(
            Action::SwitchModel("phi3:mini".to_string()),
            &mut ctx,
            &mut provider,
            Some(&discovery),
        )
        .await;

        assert_eq!(provider.available_models(), vec!["llama3.2", "gemma2"]);
        assert_eq!(ctx.state.current_model.as_deref(), Some("llama3.2"));
        assert_eq!(ctx.log.messages()[0].kind(), MessageKind::Error);
    }

    #[tokio::test]
    async fn test_show_model_info_without_discovery() {
        let mut ctx = SessionContext::new(None);
        let mut provider = provider();

        CommandRouter::dispatch(Action::ShowModelInfo, &mut ctx, &mut provider, None).await;

        assert_eq!(
            ctx.log.messages()[0].content(),
            "Current model: llama3.2\nAvailable models: llama3.2, gemma2"
        );
    }
}
