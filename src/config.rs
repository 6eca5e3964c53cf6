use eyre::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Log level configured in charla.yaml (RUST_LOG env var takes precedence)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

/// Main charla configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Ollama model to chat with
    pub model: String,
    /// Base URL of the Ollama API
    pub ollama_host: String,
    /// Seconds to wait for a generation before giving up
    pub request_timeout_secs: u64,
    pub generation: GenerationOptions,
    /// How many trailing messages are sent to the model each turn (0 = all)
    pub chat_history_limit: usize,
    pub save_conversations: bool,
    pub conversation_dir: PathBuf,
    /// Name shown at the input prompt
    pub user_name: String,
    /// Name shown on assistant replies
    pub assistant_name: String,
    /// Draw assistant replies inside a bordered panel
    pub use_panels: bool,
    pub log_level: LogLevel,
    /// Words that make the analyzer offer the tag instructions to the model
    pub search_triggers: Vec<String>,
    /// Personality name -> system prompt, in file order
    pub personalities: IndexMap<String, String>,
}

/// Sampling options forwarded to Ollama on every generation
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationOptions {
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub top_k: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2000,
            top_p: 0.9,
            top_k: 40,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: "gemma3:1b".to_string(),
            ollama_host: "http://localhost:11434".to_string(),
            request_timeout_secs: 120,
            generation: GenerationOptions::default(),
            chat_history_limit: 20,
            save_conversations: true,
            conversation_dir: Self::data_dir().join("conversations"),
            user_name: "You".to_string(),
            assistant_name: "Charla".to_string(),
            use_panels: true,
            log_level: LogLevel::Info,
            search_triggers: vec![
                "search".to_string(),
                "look up".to_string(),
                "find out".to_string(),
                "remember".to_string(),
                "busca".to_string(),
                "recuerda".to_string(),
            ],
            personalities: default_personalities(),
        }
    }
}

fn default_personalities() -> IndexMap<String, String> {
    IndexMap::from([
        (
            "default".to_string(),
            "You are Charla, a friendly and knowledgeable assistant.".to_string(),
        ),
        (
            "creative".to_string(),
            "You are Charla, an imaginative assistant who loves wordplay and unexpected ideas.".to_string(),
        ),
        (
            "technical".to_string(),
            "You are Charla, a precise assistant with deep expertise in programming and technology.".to_string(),
        ),
        (
            "concise".to_string(),
            "You are Charla, an assistant who answers briefly and directly.".to_string(),
        ),
        (
            "educational".to_string(),
            "You are Charla, a patient teacher who explains concepts clearly with examples.".to_string(),
        ),
    ])
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Otherwise the first config file that exists wins; a broken file
        // is fatal rather than silently shadowed by a later fallback.
        for path in Self::candidate_paths() {
            if path.exists() {
                return Self::load_from_file(&path).context(format!("Failed to load config from {}", path.display()));
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if let Ok(env_path) = std::env::var("CHARLA_CONFIG") {
            candidates.push(PathBuf::from(env_path));
        }
        if let Ok(charla_dir) = std::env::var("CHARLA_DIR") {
            candidates.push(PathBuf::from(charla_dir).join("charla.yaml"));
        }
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("charla").join("charla.yaml"));
        }
        // ./charla.yaml (for development)
        candidates.push(PathBuf::from("charla.yaml"));

        candidates
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Reject misconfigurations that would only surface mid-session
    pub fn validate(&self) -> Result<()> {
        if self.personalities.is_empty() {
            eyre::bail!("No personalities configured; at least 'default' is required");
        }
        if !self.personalities.contains_key("default") {
            eyre::bail!("Personality mapping must contain a 'default' entry");
        }
        for (name, prompt) in &self.personalities {
            if name.trim().is_empty() {
                eyre::bail!("Personality names must not be empty");
            }
            if prompt.trim().is_empty() {
                eyre::bail!("Personality '{}' has an empty system prompt", name);
            }
        }
        if !(0.0..=1.0).contains(&self.generation.temperature) {
            eyre::bail!("temperature must be between 0.0 and 1.0, got {}", self.generation.temperature);
        }
        if self.generation.max_tokens == 0 {
            eyre::bail!("max_tokens must be at least 1");
        }
        Ok(())
    }

    /// Get the charla directory (config file lives here)
    pub fn charla_dir() -> PathBuf {
        std::env::var("CHARLA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("charla"))
    }

    fn data_dir() -> PathBuf {
        std::env::var("CHARLA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")).join("charla"))
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.personalities.contains_key("default"));
        assert_eq!(config.ollama_host, "http://localhost:11434");
    }

    #[test]
    fn test_personalities_keep_file_order() {
        let config = Config::default();
        let names: Vec<&str> = config.personalities.keys().map(String::as_str).collect();
        assert_eq!(names[0], "default");
        assert_eq!(names[1], "creative");
    }

    #[test]
    fn test_validate_rejects_empty_prompt() {
        let mut config = Config::default();
        config.personalities.insert("hollow".to_string(), "  ".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("hollow"));
    }

    #[test]
    fn test_validate_requires_default_personality() {
        let mut config = Config::default();
        config.personalities.shift_remove("default");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_temperature() {
        let mut config = Config::default();
        config.generation.temperature = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_fills_in_defaults() {
        let config: Config = serde_yaml::from_str("model: llama3:8b\n").unwrap();
        assert_eq!(config.model, "llama3:8b");
        assert_eq!(config.chat_history_limit, 20);
        assert!(config.personalities.contains_key("default"));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = Config::default();
        let yaml_str = serde_yaml::to_string(&config).expect("Failed to serialize");
        let parsed: Config = serde_yaml::from_str(&yaml_str).expect("Failed to deserialize");
        assert_eq!(parsed.model, config.model);
        assert_eq!(parsed.personalities.len(), config.personalities.len());
        assert_eq!(parsed.generation.max_tokens, config.generation.max_tokens);
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/conversations");
        let expanded = Config::expand_path(&path);
        assert!(!expanded.to_string_lossy().contains('~'));
        assert!(expanded.to_string_lossy().contains("conversations"));
    }

    #[test]
    fn test_load_returns_config() {
        let result = Config::load(None);
        assert!(result.is_ok());
    }
}
