//! Mailbox abstraction consumed by the archival pipeline.
//!
//! A [`Mailbox`] exposes labels, a search over conversations, and the few
//! conversation-level mutations the pipeline performs (relabel, archive).
//! Search results are fully materialized [`Conversation`] values so the
//! pipeline never depends on a store's pagination.

pub mod error;
pub mod memory;
pub mod parser;
pub mod query;
pub mod spool;

use chrono::{DateTime, Utc};

pub use error::MailboxError;
pub use memory::{MailboxMutation, MemoryMailbox};
pub use parser::parse_message;
pub use query::{build_search_query, SearchQuery};
pub use spool::SpoolMailbox;

/// Handle to a label that exists in the mailbox.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelHandle {
    pub name: String,
}

impl LabelHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Whether a part is referenced from the body (`cid:`) or offered for download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Inline,
    Attachment,
}

/// A non-body MIME part of a message.
#[derive(Debug, Clone)]
pub struct MessagePart {
    /// Name declared by the part, or one derived from its MIME type.
    pub filename: String,
    /// Declared MIME type, if any.
    pub mime_type: Option<String>,
    /// Raw `Content-ID` header value (may still carry angle brackets).
    pub content_id: Option<String>,
    pub kind: PartKind,
    pub data: Vec<u8>,
}

impl MessagePart {
    pub fn is_inline(&self) -> bool {
        self.kind == PartKind::Inline
    }

    /// Content-ID with angle brackets removed and whitespace trimmed.
    /// Returns `None` when the part carries no usable id.
    pub fn normalized_content_id(&self) -> Option<String> {
        let raw = self.content_id.as_deref()?;
        let cid: String = raw.chars().filter(|c| *c != '<' && *c != '>').collect();
        let cid = cid.trim();
        if cid.is_empty() {
            None
        } else {
            Some(cid.to_string())
        }
    }
}

/// A single message inside a conversation.
#[derive(Debug, Clone)]
pub struct Message {
    /// Stable unique identifier.
    pub id: String,
    pub from: String,
    pub to: String,
    pub cc: String,
    pub subject: Option<String>,
    /// HTML body; may be empty.
    pub body_html: String,
    pub date: DateTime<Utc>,
    pub unread: bool,
    pub parts: Vec<MessagePart>,
}

impl Message {
    /// Parts referenced from the body through `cid:` URIs.
    pub fn inline_parts(&self) -> impl Iterator<Item = &MessagePart> {
        self.parts.iter().filter(|p| p.is_inline())
    }

    /// Regular (downloadable) attachments.
    pub fn attachments(&self) -> impl Iterator<Item = &MessagePart> {
        self.parts.iter().filter(|p| !p.is_inline())
    }
}

/// An ordered group of related messages.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: String,
    pub messages: Vec<Message>,
}

/// The mailbox/message store the pipeline reads from and relabels.
pub trait Mailbox: Send + Sync {
    /// Returns the label with this exact name, creating it when absent.
    fn find_or_create_label(&self, name: &str) -> Result<LabelHandle, MailboxError>;

    /// Runs a search query and returns every matching conversation.
    fn search(&self, query: &str) -> Result<Vec<Conversation>, MailboxError>;

    fn add_label(
        &self,
        conversation: &Conversation,
        label: &LabelHandle,
    ) -> Result<(), MailboxError>;

    fn remove_label(
        &self,
        conversation: &Conversation,
        label: &LabelHandle,
    ) -> Result<(), MailboxError>;

    /// Removes the conversation from the active inbox view.
    fn archive(&self, conversation: &Conversation) -> Result<(), MailboxError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(content_id: Option<&str>, kind: PartKind) -> MessagePart {
        MessagePart {
            filename: "logo.png".to_string(),
            mime_type: Some("image/png".to_string()),
            content_id: content_id.map(str::to_string),
            kind,
            data: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_normalized_content_id_strips_brackets() {
        assert_eq!(
            part(Some("<logo@example>"), PartKind::Inline).normalized_content_id(),
            Some("logo@example".to_string())
        );
        assert_eq!(
            part(Some("  <logo> "), PartKind::Inline).normalized_content_id(),
            Some("logo".to_string())
        );
    }

    #[test]
    fn test_normalized_content_id_empty() {
        assert_eq!(part(Some("<>"), PartKind::Inline).normalized_content_id(), None);
        assert_eq!(part(None, PartKind::Inline).normalized_content_id(), None);
    }

    #[test]
    fn test_message_part_filters() {
        let message = Message {
            id: "m1".to_string(),
            from: String::new(),
            to: String::new(),
            cc: String::new(),
            subject: None,
            body_html: String::new(),
            date: Utc::now(),
            unread: true,
            parts: vec![
                part(Some("logo"), PartKind::Inline),
                part(None, PartKind::Attachment),
                part(None, PartKind::Attachment),
            ],
        };

        assert_eq!(message.inline_parts().count(), 1);
        assert_eq!(message.attachments().count(), 2);
    }
}
