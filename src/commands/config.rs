use colored::*;
use eyre::{Context, Result};
use std::fs;

use crate::cli::{ConfigAction, OutputFormat};
use crate::config::Config;

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
        ConfigAction::Get { key } => get(&key, config),
        ConfigAction::Set { key, value } => set(&key, &value, config),
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(config)?);
        }
        OutputFormat::Text => {
            println!("{}", "Charla Configuration".bold());
            println!();

            println!("{}:", "model".cyan());
            println!("  model: {}", config.model);
            println!("  ollama_host: {}", config.ollama_host);
            println!("  request_timeout_secs: {}", config.request_timeout_secs);
            println!("  temperature: {}", config.generation.temperature);
            println!("  max_tokens: {}", config.generation.max_tokens);
            println!();

            println!("{}:", "conversation".cyan());
            println!("  chat_history_limit: {}", config.chat_history_limit);
            println!("  save_conversations: {}", config.save_conversations);
            println!("  conversation_dir: {}", config.conversation_dir.display());
            println!();

            println!("{}:", "personalities".cyan());
            for name in config.personalities.keys() {
                println!("  - {}", name);
            }
        }
    }

    Ok(())
}

fn get(key: &str, config: &Config) -> Result<()> {
    let value = match key {
        "model" => Some(config.model.clone()),
        "ollama_host" => Some(config.ollama_host.clone()),
        "request_timeout_secs" => Some(config.request_timeout_secs.to_string()),
        "temperature" | "generation.temperature" => Some(config.generation.temperature.to_string()),
        "max_tokens" | "generation.max_tokens" => Some(config.generation.max_tokens.to_string()),
        "chat_history_limit" => Some(config.chat_history_limit.to_string()),
        "save_conversations" => Some(config.save_conversations.to_string()),
        "conversation_dir" => Some(config.conversation_dir.display().to_string()),
        "user_name" => Some(config.user_name.clone()),
        "assistant_name" => Some(config.assistant_name.clone()),
        "use_panels" => Some(config.use_panels.to_string()),
        "log_level" | "log-level" => Some(config.log_level.as_filter().to_string()),
        _ => None,
    };

    match value {
        Some(v) => println!("{}", v),
        None => {
            eprintln!("{} Unknown config key: {}", "✗".red(), key);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn set(key: &str, value: &str, config: &Config) -> Result<()> {
    println!("{} Setting {} = {}", "→".blue(), key.cyan(), value.green());

    let mut new_config = config.clone();

    match key {
        "model" => new_config.model = value.to_string(),
        "ollama_host" => new_config.ollama_host = value.to_string(),
        "request_timeout_secs" => {
            new_config.request_timeout_secs = value.parse().context("Invalid number of seconds")?;
        }
        "temperature" | "generation.temperature" => {
            new_config.generation.temperature = value.parse().context("Invalid temperature (use e.g. 0.7)")?;
        }
        "max_tokens" | "generation.max_tokens" => {
            new_config.generation.max_tokens = value.parse().context("Invalid token count")?;
        }
        "chat_history_limit" => {
            new_config.chat_history_limit = value.parse().context("Invalid message count")?;
        }
        "save_conversations" => {
            new_config.save_conversations =
                value.parse().context("Invalid boolean value (use 'true' or 'false')")?;
        }
        "conversation_dir" => new_config.conversation_dir = value.into(),
        "user_name" => new_config.user_name = value.to_string(),
        "assistant_name" => new_config.assistant_name = value.to_string(),
        "use_panels" => {
            new_config.use_panels = value.parse().context("Invalid boolean value (use 'true' or 'false')")?;
        }
        _ => {
            eyre::bail!("Unknown config key: {}", key);
        }
    }

    new_config.validate()?;

    let config_path = Config::charla_dir().join("charla.yaml");
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let yaml_str = serde_yaml::to_string(&new_config).context("Failed to serialize config")?;
    fs::write(&config_path, yaml_str).context("Failed to write config file")?;

    println!("  {} Saved to {}", "✓".green(), config_path.display());

    Ok(())
}
