use colored::*;
use eyre::{Context, Result};
use std::fs;

use crate::cli::{OutputFormat, PersonalityAction};
use crate::config::Config;
use crate::personality::PersonalityStore;
use crate::render;

pub fn run(action: PersonalityAction, config: &Config) -> Result<()> {
    match action {
        PersonalityAction::List { format } => list(OutputFormat::resolve(format), config),
        PersonalityAction::Info { name } => info(&name, config),
        PersonalityAction::Add { name, prompt } => add(&name, &prompt, config),
        PersonalityAction::Remove { name } => remove(&name, config),
    }
}

fn list(format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&config.personalities)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(&config.personalities)?);
        }
        OutputFormat::Text => {
            let store = PersonalityStore::from_config(config);
            render::print_personalities(&store, "default");
        }
    }
    Ok(())
}

fn info(name: &str, config: &Config) -> Result<()> {
    let store = PersonalityStore::from_config(config);
    match store.get(name) {
        Ok(prompt) => {
            render::print_personality_info(name, prompt);
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            std::process::exit(1);
        }
    }
}

fn add(name: &str, prompt: &str, config: &Config) -> Result<()> {
    let store = PersonalityStore::from_config(config);
    if store.contains(name) {
        eyre::bail!("Personality '{}' already exists; remove it first to replace it", name);
    }
    if prompt.trim().is_empty() {
        eyre::bail!("Personality prompt must not be empty");
    }

    let mut new_config = config.clone();
    new_config.personalities.insert(name.to_string(), prompt.to_string());
    new_config.validate()?;
    write_config(&new_config)?;

    println!("{} Added personality {}", "✓".green(), name.cyan());
    Ok(())
}

fn remove(name: &str, config: &Config) -> Result<()> {
    if name == "default" {
        eyre::bail!("The 'default' personality cannot be removed");
    }
    if !PersonalityStore::from_config(config).contains(name) {
        eyre::bail!("Personality '{}' does not exist", name);
    }

    let mut new_config = config.clone();
    new_config.personalities.shift_remove(name);
    write_config(&new_config)?;

    println!("{} Removed personality {}", "✓".green(), name.cyan());
    Ok(())
}

fn write_config(config: &Config) -> Result<()> {
    let config_path = Config::charla_dir().join("charla.yaml");
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let yaml_str = serde_yaml::to_string(config).context("Failed to serialize config")?;
    fs::write(&config_path, yaml_str).context("Failed to write config file")?;

    println!("  {} Saved to {}", "✓".green(), config_path.display());
    Ok(())
}
