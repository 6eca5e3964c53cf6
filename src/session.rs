//! Chat session orchestration
//!
//! One session drives the whole pipeline: intercept session commands,
//! analyze the user message, generate, extract tags, and hand the reply
//! to the caller for rendering. The session owns the conversation history
//! and the active personality; persistence and terminal output stay with
//! the caller.

use crate::analyzer::PromptAnalyzer;
use crate::config::{Config, GenerationOptions};
use crate::conversation::Conversation;
use crate::error::ChatError;
use crate::extractor::{self, ExtractedCommand};
use crate::ollama::Generator;
use crate::personality::PersonalityStore;

/// A user input intercepted before it reaches the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Exit,
    Clear,
    Help,
    PersonalityList,
    PersonalitySet(String),
    PersonalityInfo(String),
    MemoryList,
    MemoryLoad(String),
    Unknown(String),
}

/// Parse a `/`-prefixed session command. Anything else is a chat turn.
pub fn parse_session_command(input: &str) -> Option<SessionCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let mut parts = trimmed.split_whitespace();
    let command = parts.next().unwrap_or("/");

    let parsed = match command.to_lowercase().as_str() {
        "/exit" | "/quit" => SessionCommand::Exit,
        "/clear" => SessionCommand::Clear,
        "/help" => SessionCommand::Help,
        "/personality" => match (parts.next(), parts.next()) {
            (Some("list"), _) => SessionCommand::PersonalityList,
            (Some("set"), Some(name)) => SessionCommand::PersonalitySet(name.to_string()),
            (Some("info"), Some(name)) => SessionCommand::PersonalityInfo(name.to_string()),
            _ => SessionCommand::Unknown("usage: /personality list|set <name>|info <name>".to_string()),
        },
        "/memory" => match (parts.next(), parts.next()) {
            (Some("list"), _) => SessionCommand::MemoryList,
            (Some("load"), Some(id)) => SessionCommand::MemoryLoad(id.to_string()),
            _ => SessionCommand::Unknown("usage: /memory list|load <id>".to_string()),
        },
        other => SessionCommand::Unknown(format!("unknown command '{}'; try /help", other)),
    };

    Some(parsed)
}

/// One successful exchange: the reply text plus any tags found in it
#[derive(Debug, Clone)]
pub struct TurnReply {
    pub text: String,
    pub commands: Vec<ExtractedCommand>,
}

pub struct ChatSession<G: Generator> {
    client: G,
    store: PersonalityStore,
    analyzer: PromptAnalyzer,
    options: GenerationOptions,
    history_limit: usize,
    active: String,
    conversation: Conversation,
}

impl<G: Generator> ChatSession<G> {
    pub fn new(config: &Config, store: PersonalityStore, client: G) -> Self {
        let analyzer = PromptAnalyzer::from_config(config);
        // Config validation guarantees a 'default' entry
        let active = "default".to_string();
        let conversation = match store.get(&active) {
            Ok(prompt) => Conversation::with_system_prompt(prompt),
            Err(_) => Conversation::empty(),
        };

        Self {
            client,
            store,
            analyzer,
            options: config.generation,
            history_limit: config.chat_history_limit,
            active,
            conversation,
        }
    }

    pub fn active_personality(&self) -> &str {
        &self.active
    }

    pub fn personalities(&self) -> &PersonalityStore {
        &self.store
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Run one chat turn. The user message is recorded even when
    /// generation fails; a failed turn appends no assistant message and
    /// leaves the session ready for the next input.
    pub fn send(&mut self, user_input: &str) -> Result<TurnReply, ChatError> {
        self.conversation.add_user_message(user_input);

        let analysis = self.analyzer.analyze(user_input);
        let base_prompt = self.store.get(&self.active)?;
        let system_prompt = if analysis.augment {
            log::debug!("Augmenting system context with tag instructions");
            format!("{}\n\n{}", base_prompt, analysis.instructions)
        } else {
            base_prompt.to_string()
        };

        let window = self.conversation.window(self.history_limit);
        let reply = self.client.generate(&system_prompt, &window, &self.options)?;

        let commands: Vec<ExtractedCommand> = extractor::scan(&reply).collect();
        for command in &commands {
            log::info!("Model requested {}: '{}'", command.kind, command.payload);
        }

        self.conversation.add_assistant_message(reply.clone());

        Ok(TurnReply { text: reply, commands })
    }

    /// Switch personality and start a fresh conversation seeded with its
    /// prompt. An unknown name changes nothing.
    pub fn set_personality(&mut self, name: &str) -> Result<(), ChatError> {
        let prompt = self.store.get(name)?;
        self.conversation = Conversation::with_system_prompt(prompt);
        self.active = name.to_string();
        log::info!("Switched personality to '{}'", name);
        Ok(())
    }

    /// Drop the history and start over with the active personality
    pub fn clear(&mut self) -> Result<(), ChatError> {
        let prompt = self.store.get(&self.active)?;
        self.conversation = Conversation::with_system_prompt(prompt);
        Ok(())
    }

    /// Continue a previously saved conversation
    pub fn resume(&mut self, conversation: Conversation) {
        self.conversation = conversation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Message, Role};
    use std::cell::RefCell;

    /// Scripted stand-in for the Ollama client
    struct StubGenerator {
        replies: RefCell<Vec<Result<String, ChatError>>>,
        calls: RefCell<usize>,
        seen_prompts: RefCell<Vec<String>>,
    }

    impl StubGenerator {
        fn new(replies: Vec<Result<String, ChatError>>) -> Self {
            Self {
                replies: RefCell::new(replies),
                calls: RefCell::new(0),
                seen_prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl Generator for StubGenerator {
        fn generate(
            &self,
            system_prompt: &str,
            _history: &[&Message],
            _options: &GenerationOptions,
        ) -> Result<String, ChatError> {
            *self.calls.borrow_mut() += 1;
            self.seen_prompts.borrow_mut().push(system_prompt.to_string());
            self.replies.borrow_mut().remove(0)
        }
    }

    fn session(replies: Vec<Result<String, ChatError>>) -> ChatSession<StubGenerator> {
        let config = Config::default();
        let store = PersonalityStore::from_config(&config);
        ChatSession::new(&config, store, StubGenerator::new(replies))
    }

    #[test]
    fn test_successful_turn_appends_both_messages() {
        let mut session = session(vec![Ok("bonjour".to_string())]);
        let reply = session.send("hola").unwrap();

        assert_eq!(reply.text, "bonjour");
        assert!(reply.commands.is_empty());
        let roles: Vec<Role> = session.conversation().messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
    }

    #[test]
    fn test_reply_tags_are_extracted() {
        let mut session = session(vec![Ok("let me check <search>rust iterators</search>".to_string())]);
        let reply = session.send("tell me about iterators").unwrap();

        assert_eq!(reply.commands.len(), 1);
        assert_eq!(reply.commands[0].payload, "rust iterators");
    }

    #[test]
    fn test_failed_turn_keeps_user_message_only() {
        let mut session = session(vec![
            Err(ChatError::Timeout { limit_secs: 1 }),
            Ok("recovered".to_string()),
        ]);

        let err = session.send("are you there?").unwrap_err();
        assert!(matches!(err, ChatError::Timeout { .. }));

        let roles: Vec<Role> = session.conversation().messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User]);

        // The session still accepts input after a failure
        let reply = session.send("how about now?").unwrap();
        assert_eq!(reply.text, "recovered");
        assert_eq!(session.conversation().message_count(), 4);
    }

    #[test]
    fn test_no_retry_on_failure() {
        let mut session = session(vec![Err(ChatError::Model("boom".to_string()))]);
        let _ = session.send("hi");
        assert_eq!(*session.client.calls.borrow(), 1);
    }

    #[test]
    fn test_question_augments_system_prompt() {
        let mut session = session(vec![Ok("42".to_string()), Ok("ok".to_string())]);

        session.send("what is the answer?").unwrap();
        session.send("thanks for that").unwrap();

        let prompts = session.client.seen_prompts.borrow();
        assert!(prompts[0].contains("<search>"));
        assert!(!prompts[1].contains("<search>"));
    }

    #[test]
    fn test_unknown_personality_switch_changes_nothing() {
        let mut session = session(vec![]);
        session.conversation.add_user_message("context to keep");

        let err = session.set_personality("pirate").unwrap_err();
        assert!(matches!(err, ChatError::UnknownPersonality(_)));
        assert_eq!(session.active_personality(), "default");
        assert_eq!(session.conversation().message_count(), 2);
    }

    #[test]
    fn test_personality_switch_reseeds_conversation() {
        let mut session = session(vec![]);
        session.conversation.add_user_message("old context");

        session.set_personality("concise").unwrap();

        assert_eq!(session.active_personality(), "concise");
        assert_eq!(session.conversation().message_count(), 1);
        assert_eq!(session.conversation().messages[0].role, Role::System);
        assert!(session.conversation().messages[0].content.contains("briefly"));
    }

    #[test]
    fn test_clear_restarts_with_active_personality() {
        let mut session = session(vec![]);
        session.set_personality("technical").unwrap();
        session.conversation.add_user_message("noise");

        session.clear().unwrap();

        assert_eq!(session.conversation().message_count(), 1);
        assert_eq!(session.active_personality(), "technical");
    }

    #[test]
    fn test_parse_exit_and_aliases() {
        assert_eq!(parse_session_command("/exit"), Some(SessionCommand::Exit));
        assert_eq!(parse_session_command("/quit"), Some(SessionCommand::Exit));
        assert_eq!(parse_session_command("  /EXIT  "), Some(SessionCommand::Exit));
    }

    #[test]
    fn test_parse_personality_commands() {
        assert_eq!(
            parse_session_command("/personality set technical"),
            Some(SessionCommand::PersonalitySet("technical".to_string()))
        );
        assert_eq!(
            parse_session_command("/personality list"),
            Some(SessionCommand::PersonalityList)
        );
        assert!(matches!(
            parse_session_command("/personality set"),
            Some(SessionCommand::Unknown(_))
        ));
    }

    #[test]
    fn test_parse_memory_commands() {
        assert_eq!(parse_session_command("/memory list"), Some(SessionCommand::MemoryList));
        assert_eq!(
            parse_session_command("/memory load 1a2b"),
            Some(SessionCommand::MemoryLoad("1a2b".to_string()))
        );
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(parse_session_command("hello there"), None);
        assert_eq!(parse_session_command(""), None);
    }

    #[test]
    fn test_unknown_command_gets_a_hint() {
        assert!(matches!(
            parse_session_command("/dance"),
            Some(SessionCommand::Unknown(ref hint)) if hint.contains("/help")
        ));
    }
}
