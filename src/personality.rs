//! Personality store
//!
//! A closed, validated mapping from personality name to system prompt,
//! built once from configuration. The store does no I/O and never changes
//! during a session; the active personality is session state, not store
//! state.

use indexmap::IndexMap;

use crate::config::Config;
use crate::error::ChatError;

#[derive(Debug, Clone)]
pub struct PersonalityStore {
    prompts: IndexMap<String, String>,
}

impl PersonalityStore {
    /// Build the store from an already-validated config
    pub fn from_config(config: &Config) -> Self {
        Self {
            prompts: config.personalities.clone(),
        }
    }

    /// Personality names in configuration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.prompts.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.prompts.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<&str, ChatError> {
        self.prompts
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ChatError::UnknownPersonality(name.to_string()))
    }
}
