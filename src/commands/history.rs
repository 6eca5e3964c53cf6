use colored::*;
use eyre::Result;
use serde_json::json;

use crate::cli::{HistoryAction, OutputFormat};
use crate::config::Config;
use crate::conversation::Role;
use crate::render;
use crate::transcript::TranscriptStore;

pub fn run(action: HistoryAction, config: &Config) -> Result<()> {
    let store = TranscriptStore::new(Config::expand_path(&config.conversation_dir));

    match action {
        HistoryAction::List { format } => list(OutputFormat::resolve(format), &store),
        HistoryAction::Show { id } => show(&id, &store),
    }
}

fn list(format: OutputFormat, store: &TranscriptStore) -> Result<()> {
    let summaries = store.list()?;

    match format {
        OutputFormat::Text => render::print_transcripts(&summaries),
        OutputFormat::Json | OutputFormat::Yaml => {
            let entries: Vec<serde_json::Value> = summaries
                .iter()
                .map(|s| {
                    json!({
                        "id": s.id,
                        "created_at": s.created_at.to_rfc3339(),
                        "updated_at": s.updated_at.to_rfc3339(),
                        "message_count": s.message_count,
                    })
                })
                .collect();
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                println!("{}", serde_yaml::to_string(&entries)?);
            }
        }
    }

    Ok(())
}

fn show(id: &str, store: &TranscriptStore) -> Result<()> {
    let conversation = store.load(id)?;

    println!(
        "{}",
        format!(
            "Conversation {} · started {}",
            conversation.id,
            conversation.created_at.format("%Y-%m-%d %H:%M")
        )
        .bold()
    );
    println!();

    for message in &conversation.messages {
        let label = match message.role {
            Role::System => "[system]".dimmed(),
            Role::User => "[user]".green(),
            Role::Assistant => "[assistant]".blue(),
        };
        println!("{} {}", label.bold(), message.content);
    }

    Ok(())
}
