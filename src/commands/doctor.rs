//! Diagnose charla setup issues

use colored::*;
use eyre::Result;

use crate::config::Config;
use crate::ollama::OllamaClient;

pub fn run(config: &Config) -> Result<()> {
    println!("{}", "Charla Doctor".bold());
    println!("{}", "═".repeat(50));
    println!();

    let mut issues = 0;

    // Check charla directory and config file
    let charla_dir = Config::charla_dir();
    if charla_dir.exists() {
        println!("{} Charla directory: {}", "✓".green(), charla_dir.display());
    } else {
        println!("{} Charla directory missing: {}", "✗".red(), charla_dir.display());
        println!("  Run {} to create it", "charla init".cyan());
        issues += 1;
    }

    let config_file = charla_dir.join("charla.yaml");
    if config_file.exists() {
        println!("{} Config file: {}", "✓".green(), config_file.display());
    } else {
        println!("{} Config file missing: {} (using defaults)", "⚠".yellow(), config_file.display());
    }

    // Check conversation directory
    let conversation_dir = Config::expand_path(&config.conversation_dir);
    if conversation_dir.exists() {
        println!("{} Conversation directory: {}", "✓".green(), conversation_dir.display());
    } else {
        println!(
            "{} Conversation directory missing: {} (created on first save)",
            "⚠".yellow(),
            conversation_dir.display()
        );
    }

    // Check personalities
    match config.validate() {
        Ok(()) => println!("{} Personalities: {} configured", "✓".green(), config.personalities.len()),
        Err(e) => {
            println!("{} Personality configuration invalid: {}", "✗".red(), e);
            issues += 1;
        }
    }

    println!();
    println!("{}", "Ollama:".bold());

    // Check the ollama binary (useful hint, not required for a remote host)
    match which::which("ollama") {
        Ok(path) => println!("  {} ollama binary: {}", "✓".green(), path.display()),
        Err(_) => println!("  {} ollama binary not on PATH", "⚠".yellow()),
    }

    // Check the serving endpoint
    let client = OllamaClient::new(config);
    match client.version() {
        Ok(version) => {
            println!("  {} Server reachable at {} (version {})", "✓".green(), client.host(), version);
            println!("  Configured model: {}", config.model.cyan());
        }
        Err(e) => {
            println!("  {} Server unreachable: {}", "✗".red(), e);
            println!("  Start it with {} and re-run doctor", "ollama serve".cyan());
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("{} Everything looks good.", "✓".green());
    } else {
        println!("{} {} issue(s) found.", "✗".red(), issues);
    }

    Ok(())
}
