use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dmitry")]
#[command(version)]
#[command(about = "Chat with locally hosted Ollama models from your terminal", long_about = None)]
pub struct Cli {
    /// Model to start with (e.g., llama3.2:latest)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Path to configuration file (replaces the global and project files)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Replay whole replies character by character instead of streaming them
    #[arg(long)]
    pub simulate_stream: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Initialize configuration
    Init,
    /// List installed models
    List,
    /// Start a chat session (default)
    Chat,
    /// Show version information
    Version,
    /// Check Ollama and configuration status
    Status,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_to_chat() {
        let cli = Cli::parse_from(["dmitry"]);
        assert!(cli.command.is_none());
        assert!(!cli.simulate_stream);
    }

    #[test]
    fn test_parse_flags_and_subcommand() {
        let cli = Cli::parse_from(["dmitry", "-m", "gemma2:2b", "--simulate-stream", "-v", "list"]);
        assert_eq!(cli.model.as_deref(), Some("gemma2:2b"));
        assert!(cli.simulate_stream);
        assert!(cli.verbose);
        assert_eq!(cli.command, Some(Commands::List));
    }
}
