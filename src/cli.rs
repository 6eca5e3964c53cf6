use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "charla",
    about = "A friendly command-line chat for locally hosted Ollama models",
    version,
    after_help = "Logs are written to: ~/.local/share/charla/logs/charla.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to charla.yaml config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Personality to start with
        #[arg(long, short = 'p')]
        personality: Option<String>,

        /// Override the configured model for this session
        #[arg(long, short = 'm')]
        model: Option<String>,
    },

    /// Manage personalities
    Personality {
        #[command(subcommand)]
        action: PersonalityAction,
    },

    /// Browse saved conversations
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Write a starter config file
    Init {
        /// Directory to initialize (defaults to ~/.config/charla)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Diagnose setup issues
    Doctor,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum PersonalityAction {
    /// List configured personalities
    List {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Show a personality's full system prompt
    Info {
        /// Personality name
        name: String,
    },

    /// Add a personality to the config file
    Add {
        /// Personality name
        name: String,

        /// System prompt for this personality
        #[arg(long)]
        prompt: String,
    },

    /// Remove a personality from the config file
    Remove {
        /// Personality name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List saved conversations
    List {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Print a saved conversation
    Show {
        /// Conversation id (or unique prefix)
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Get a configuration value
    Get {
        /// Configuration key (dot notation)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,

        /// New value
        value: String,
    },
}
