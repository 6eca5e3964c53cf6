//! Per-turn error kinds
//!
//! Startup failures (bad config, unwritable log directory) are fatal and
//! travel as `eyre::Report` with context. Everything that can go wrong
//! during a single chat turn is recoverable and lands here so the session
//! can report it and keep accepting input.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    /// The Ollama endpoint could not be reached at all.
    #[error("cannot reach Ollama at {host}: {message}")]
    Connection { host: String, message: String },

    /// The endpoint was reachable but produced no response in time.
    #[error("Ollama did not answer within {limit_secs}s")]
    Timeout { limit_secs: u64 },

    /// The endpoint answered with an error payload or an unusable body.
    #[error("Ollama reported an error: {0}")]
    Model(String),

    /// A personality switch named something the store does not know.
    #[error("unknown personality '{0}'")]
    UnknownPersonality(String),
}
