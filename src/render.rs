//! Terminal rendering
//!
//! All chat-facing output goes through here: the welcome banner, assistant
//! replies (optionally panelled), extracted-command notes, and error lines.

use colored::*;
use terminal_size::{Width, terminal_size};

use crate::config::Config;
use crate::extractor;
use crate::personality::PersonalityStore;
use crate::session::TurnReply;
use crate::transcript::TranscriptSummary;

fn term_width() -> usize {
    terminal_size().map(|(Width(w), _)| w as usize).unwrap_or(80)
}

pub fn print_welcome(config: &Config, version: &str) {
    let rule = "═".repeat(term_width().min(60));
    println!("{}", rule.dimmed());
    println!("{}", format!("Charla — chatting with {}", config.model).bold());
    println!(
        "Ollama {} at {}  ·  temperature {}",
        version,
        config.ollama_host.dimmed(),
        config.generation.temperature
    );
    println!("Type {} for commands, {} to leave.", "/help".cyan(), "/exit".cyan());
    println!("{}", rule.dimmed());
}

pub fn prompt_label(config: &Config) -> String {
    format!("{} ", format!("{}>", config.user_name).green().bold())
}

/// Show one assistant reply with its tags rewritten as readable notes
pub fn print_reply(config: &Config, reply: &TurnReply) {
    let annotated = extractor::annotate(&reply.text);

    if config.use_panels {
        let width = term_width().min(60);
        let title = format!("── {} ", config.assistant_name);
        let pad = width.saturating_sub(title.chars().count());
        println!("{}{}", title.blue().bold(), "─".repeat(pad).blue());
        println!("{}", annotated);
        println!("{}", "─".repeat(width).blue());
    } else {
        println!("{} {}", format!("{}:", config.assistant_name).blue().bold(), annotated);
    }

    for command in &reply.commands {
        println!(
            "  {} {} requested: {}",
            "→".yellow(),
            command.kind.to_string().yellow(),
            command.payload.italic()
        );
    }
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.red());
}

pub fn print_note(message: &str) {
    println!("{} {}", "•".yellow(), message);
}

pub fn print_help() {
    println!("{}", "Session commands".bold());
    println!("  {}                 show this help", "/help".cyan());
    println!("  {}                start the conversation over", "/clear".cyan());
    println!("  {}                 leave charla", "/exit".cyan());
    println!("  {}     list personalities", "/personality list".cyan());
    println!("  {} switch personality (fresh conversation)", "/personality set <name>".cyan());
    println!("  {} show a personality's prompt", "/personality info <name>".cyan());
    println!("  {}          list saved conversations", "/memory list".cyan());
    println!("  {}     resume a saved conversation", "/memory load <id>".cyan());
}

pub fn print_personalities(store: &PersonalityStore, active: &str) {
    println!("{}", "Personalities".bold());
    for name in store.names() {
        let marker = if name == active { "●".green() } else { "○".dimmed() };
        let preview = store.get(name).unwrap_or_default();
        let preview = if preview.chars().count() > 60 {
            format!("{}…", preview.chars().take(60).collect::<String>())
        } else {
            preview.to_string()
        };
        println!("  {} {:<12} {}", marker, name.cyan(), preview.dimmed());
    }
}

pub fn print_personality_info(name: &str, prompt: &str) {
    println!("{}", format!("Personality: {}", name).bold());
    println!("{}", prompt);
}

pub fn print_transcripts(summaries: &[TranscriptSummary]) {
    if summaries.is_empty() {
        println!("{}", "No saved conversations.".yellow());
        return;
    }

    println!("{}", "Saved conversations".bold());
    for summary in summaries {
        println!(
            "  {}  {}  {:>3} messages  (updated {})",
            summary.id.cyan(),
            summary.created_at.format("%Y-%m-%d %H:%M"),
            summary.message_count,
            summary.updated_at.format("%Y-%m-%d %H:%M")
        );
    }
}
