//! Command tag extraction
//!
//! Scans assistant output for `<search>…</search>`, `<memory>…</memory>`
//! and `<query>…</query>` markers and yields them in order of appearance.
//! Extraction only classifies intent; executing a search, memory lookup,
//! or database query is a collaborator's job and is still pending.
//!
//! Matching is non-overlapping and left-to-right. Tag names are
//! case-insensitive and payloads may span lines. An opening tag with no
//! matching closer of its own kind is ignored entirely. Nested openings
//! of the same kind resolve by non-greedy matching: the scan starts at
//! the leftmost opener and the first same-kind closer ends it, so the
//! inner opening text lands in the payload verbatim.

use std::borrow::Cow;
use std::fmt;

use lazy_regex::{Lazy, lazy_regex};
use regex::{Captures, Regex};

static TAG_RE: Lazy<Regex> =
    lazy_regex!(r"(?is)<search>(.*?)</search>|<memory>(.*?)</memory>|<query>(.*?)</query>");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Search,
    Memory,
    Query,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Search => "search",
            CommandKind::Memory => "memory",
            CommandKind::Query => "query",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tag found in assistant output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedCommand {
    pub kind: CommandKind,
    pub payload: String,
    /// Byte offset of the opening tag in the source text
    pub position: usize,
}

/// Lazily yield every well-formed tag in `text`, leftmost first.
/// Calling `scan` again restarts the walk from the beginning.
pub fn scan(text: &str) -> impl Iterator<Item = ExtractedCommand> + '_ {
    TAG_RE.captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        let (kind, payload) = if let Some(p) = caps.get(1) {
            (CommandKind::Search, p)
        } else if let Some(p) = caps.get(2) {
            (CommandKind::Memory, p)
        } else {
            (CommandKind::Query, caps.get(3)?)
        };
        Some(ExtractedCommand {
            kind,
            payload: payload.as_str().to_string(),
            position: whole.start(),
        })
    })
}

/// Rewrite each well-formed tag into a human-readable note for display.
/// Text without tags comes back borrowed and untouched.
pub fn annotate(text: &str) -> Cow<'_, str> {
    TAG_RE.replace_all(text, |caps: &Captures| {
        if let Some(terms) = caps.get(1) {
            format!("[searching the internet for: {}]", terms.as_str())
        } else if let Some(terms) = caps.get(2) {
            format!("[searching memory for: {}]", terms.as_str())
        } else if let Some(terms) = caps.get(3) {
            format!("[searching the database for: {}]", terms.as_str())
        } else {
            caps[0].to_string()
        }
    })
}
