//! Conversation data model
//!
//! History is append-only: messages are never mutated or reordered after
//! creation, and insertion order is the only meaningful order.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Wire name used by the Ollama chat API
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Local>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Local::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
}

impl Conversation {
    /// Start a fresh conversation seeded with a system prompt
    pub fn with_system_prompt(system_prompt: &str) -> Self {
        let mut conversation = Self::empty();
        conversation.push(Role::System, system_prompt);
        conversation
    }

    pub fn empty() -> Self {
        let now = Local::now();
        Self {
            id: generate_id(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));
        self.updated_at = Local::now();
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.push(Role::User, content);
    }

    pub fn add_assistant_message(&mut self, content: impl Into<String>) {
        self.push(Role::Assistant, content);
    }

    /// The trailing window sent to the model: the system prompt (when
    /// present) plus at most `limit` of the latest non-system messages.
    /// A limit of 0 means the whole history.
    pub fn window(&self, limit: usize) -> Vec<&Message> {
        let (system, rest): (Vec<&Message>, Vec<&Message>) =
            self.messages.iter().partition(|m| m.role == Role::System);

        let tail_start = if limit > 0 && rest.len() > limit {
            rest.len() - limit
        } else {
            0
        };

        let mut windowed: Vec<&Message> = system.into_iter().take(1).collect();
        windowed.extend(rest.into_iter().skip(tail_start));
        windowed
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

fn generate_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("{:x}", timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_keep_insertion_order() {
        let mut conversation = Conversation::with_system_prompt("be helpful");
        conversation.add_user_message("first");
        conversation.add_assistant_message("second");
        conversation.add_user_message("third");

        let contents: Vec<&str> = conversation.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["be helpful", "first", "second", "third"]);
    }

    #[test]
    fn test_window_keeps_system_prompt_and_tail() {
        let mut conversation = Conversation::with_system_prompt("be helpful");
        for i in 0..10 {
            conversation.add_user_message(format!("question {}", i));
            conversation.add_assistant_message(format!("answer {}", i));
        }

        let window = conversation.window(4);
        assert_eq!(window.len(), 5);
        assert_eq!(window[0].role, Role::System);
        assert_eq!(window[1].content, "question 8");
        assert_eq!(window[4].content, "answer 9");
    }

    #[test]
    fn test_window_zero_limit_returns_everything() {
        let mut conversation = Conversation::with_system_prompt("be helpful");
        conversation.add_user_message("hi");

        assert_eq!(conversation.window(0).len(), 2);
    }

    #[test]
    fn test_window_without_system_prompt() {
        let mut conversation = Conversation::empty();
        conversation.add_user_message("hi");

        let window = conversation.window(10);
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].role, Role::User);
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(Role::System.as_str(), "system");
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }

    #[test]
    fn test_conversation_json_roundtrip() {
        let mut conversation = Conversation::with_system_prompt("be helpful");
        conversation.add_user_message("hola");

        let json = serde_json::to_string(&conversation).unwrap();
        let parsed: Conversation = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, conversation.id);
        assert_eq!(parsed.messages.len(), 2);
        assert_eq!(parsed.messages[1].content, "hola");
    }
}
