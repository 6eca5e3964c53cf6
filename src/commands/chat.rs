//! Interactive chat session
//!
//! The REPL around the session pipeline: read a line, intercept session
//! commands, otherwise run the turn and render the result. A failed turn
//! prints one error line and the loop keeps going; only `/exit` (or EOF)
//! ends the session.

use colored::*;
use eyre::Result;
use std::io::{self, BufRead, Write};

use crate::config::Config;
use crate::ollama::OllamaClient;
use crate::personality::PersonalityStore;
use crate::render;
use crate::session::{ChatSession, SessionCommand, parse_session_command};
use crate::transcript::TranscriptStore;

pub fn run(personality: Option<String>, model: Option<String>, config: &Config) -> Result<()> {
    let mut config = config.clone();
    if let Some(model) = model {
        config.model = model;
    }

    let client = OllamaClient::new(&config);
    let version = match client.version() {
        Ok(version) => version,
        Err(e) => {
            render::print_error(&e.to_string());
            eyre::bail!("Ollama is not reachable at {}; start it and try again", config.ollama_host);
        }
    };

    let store = PersonalityStore::from_config(&config);
    let mut session = ChatSession::new(&config, store, client);
    if let Some(name) = personality {
        session.set_personality(&name)?;
    }

    let transcripts = TranscriptStore::new(Config::expand_path(&config.conversation_dir));

    render::print_welcome(&config, &version);
    log::info!("Chat session started with model '{}'", config.model);

    let stdin = io::stdin();
    loop {
        print!("\n{}", render::prompt_label(&config));
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF counts as an exit directive
            println!();
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if let Some(command) = parse_session_command(input) {
            if handle_session_command(command, &mut session, &transcripts)? {
                break;
            }
            continue;
        }

        match session.send(input) {
            Ok(reply) => {
                render::print_reply(&config, &reply);
                if config.save_conversations {
                    if let Err(e) = transcripts.save(session.conversation()) {
                        log::warn!("Could not save conversation: {}", e);
                        render::print_error(&format!("Could not save conversation: {}", e));
                    }
                }
            }
            Err(e) => {
                log::error!("Turn failed: {}", e);
                render::print_error(&e.to_string());
            }
        }
    }

    log::info!("Chat session ended");
    Ok(())
}

/// Returns true when the session should end
fn handle_session_command(
    command: SessionCommand,
    session: &mut ChatSession<OllamaClient>,
    transcripts: &TranscriptStore,
) -> Result<bool> {
    match command {
        SessionCommand::Exit => {
            println!("{}", "Goodbye!".yellow());
            return Ok(true);
        }
        SessionCommand::Clear => {
            session.clear()?;
            render::print_note("Conversation cleared.");
        }
        SessionCommand::Help => render::print_help(),
        SessionCommand::PersonalityList => {
            render::print_personalities(session.personalities(), session.active_personality());
        }
        SessionCommand::PersonalitySet(name) => match session.set_personality(&name) {
            Ok(()) => render::print_note(&format!("Personality switched to '{}'; conversation restarted.", name)),
            Err(e) => render::print_error(&e.to_string()),
        },
        SessionCommand::PersonalityInfo(name) => match session.personalities().get(&name) {
            Ok(prompt) => render::print_personality_info(&name, prompt),
            Err(e) => render::print_error(&e.to_string()),
        },
        SessionCommand::MemoryList => match transcripts.list() {
            Ok(summaries) => render::print_transcripts(&summaries),
            Err(e) => render::print_error(&e.to_string()),
        },
        SessionCommand::MemoryLoad(id) => match transcripts.load(&id) {
            Ok(conversation) => {
                render::print_note(&format!(
                    "Resumed conversation {} ({} messages).",
                    conversation.id,
                    conversation.message_count()
                ));
                session.resume(conversation);
            }
            Err(e) => render::print_error(&e.to_string()),
        },
        SessionCommand::Unknown(hint) => render::print_error(&hint),
    }

    Ok(false)
}
