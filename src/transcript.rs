//! Saved conversation transcripts
//!
//! Finished turns are persisted as pretty JSON under the configured
//! conversation directory, one file per conversation. Listing skips
//! anything unreadable with a warning; a broken file never takes the
//! session down.

use chrono::{DateTime, Local};
use eyre::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::conversation::Conversation;

#[derive(Debug, Clone)]
pub struct TranscriptSummary {
    pub id: String,
    pub path: PathBuf,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
    pub message_count: usize,
}

pub struct TranscriptStore {
    dir: PathBuf,
}

impl TranscriptStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Write (or rewrite) the conversation's transcript file
    pub fn save(&self, conversation: &Conversation) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).context("Failed to create conversation directory")?;

        let path = self.dir.join(format!("conversation_{}.json", conversation.id));
        let json = serde_json::to_string_pretty(conversation).context("Failed to serialize conversation")?;
        fs::write(&path, json).context(format!("Failed to write {}", path.display()))?;

        log::debug!("Saved conversation to {}", path.display());
        Ok(path)
    }

    /// Summaries of every saved conversation, most recently updated first
    pub fn list(&self) -> Result<Vec<TranscriptSummary>> {
        let mut summaries = Vec::new();

        if !self.dir.exists() {
            return Ok(summaries);
        }

        for entry in fs::read_dir(&self.dir).context(format!("Failed to read {}", self.dir.display()))? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match self.read_conversation(&path) {
                Ok(conversation) => summaries.push(TranscriptSummary {
                    id: conversation.id.clone(),
                    path,
                    created_at: conversation.created_at,
                    updated_at: conversation.updated_at,
                    message_count: conversation.message_count(),
                }),
                Err(e) => log::warn!("Skipping unreadable transcript {}: {}", path.display(), e),
            }
        }

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    /// Reload a saved conversation by id or unique id prefix
    pub fn load(&self, id_prefix: &str) -> Result<Conversation> {
        let matches: Vec<TranscriptSummary> = self
            .list()?
            .into_iter()
            .filter(|s| s.id.starts_with(id_prefix))
            .collect();

        match matches.as_slice() {
            [] => eyre::bail!("No saved conversation matches '{}'", id_prefix),
            [only] => self.read_conversation(&only.path),
            _ => eyre::bail!("'{}' matches {} conversations; use a longer prefix", id_prefix, matches.len()),
        }
    }

    fn read_conversation(&self, path: &PathBuf) -> Result<Conversation> {
        let content = fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content).context(format!("Failed to parse {}", path.display()))
    }
}
