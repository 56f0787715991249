//! Mailbox error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a mailbox store.
#[derive(Error, Debug)]
pub enum MailboxError {
    /// The search query could not be understood.
    #[error("Invalid search query '{query}': {reason}")]
    InvalidQuery { query: String, reason: String },

    /// A label operation failed.
    #[error("Label '{0}' error: {1}")]
    Label(String, String),

    /// The conversation is unknown to the store.
    #[error("Conversation '{0}' not found")]
    ConversationNotFound(String),

    /// Failed to parse a stored message.
    #[error("Failed to parse message '{id}': {reason}")]
    Parse { id: String, reason: String },

    /// Failed to read or write mailbox state.
    #[error("Mailbox state error for '{path}': {reason}")]
    State { path: PathBuf, reason: String },

    /// IO error while reading or writing the mailbox.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The mailbox lock was poisoned.
    #[error("Mailbox lock poisoned")]
    LockPoisoned,
}

/// Result type for mailbox operations.
pub type Result<T> = std::result::Result<T, MailboxError>;
