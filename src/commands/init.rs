//! Initialize charla configuration

use colored::*;
use eyre::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::config::Config;

pub fn run(path: Option<PathBuf>, force: bool) -> Result<()> {
    let target_dir = path.unwrap_or_else(Config::charla_dir);
    let config_path = target_dir.join("charla.yaml");

    if config_path.exists() && !force {
        eyre::bail!(
            "{} already exists; use --force to overwrite it",
            config_path.display()
        );
    }

    fs::create_dir_all(&target_dir).context(format!("Failed to create {}", target_dir.display()))?;

    let config = Config::default();
    let yaml_str = serde_yaml::to_string(&config).context("Failed to serialize default config")?;
    fs::write(&config_path, yaml_str).context(format!("Failed to write {}", config_path.display()))?;

    println!("{} Wrote starter config to {}", "✓".green(), config_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to pick your model and personalities", config_path.display());
    println!("  2. Make sure Ollama is running ({})", "ollama serve".cyan());
    println!("  3. Start chatting with {}", "charla chat".cyan());

    Ok(())
}
