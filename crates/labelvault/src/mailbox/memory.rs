//! In-process mailbox that records every mutation.

use std::sync::{Mutex, MutexGuard};

use super::error::{MailboxError, Result};
use super::query::SearchQuery;
use super::{Conversation, LabelHandle, Mailbox, Message};

/// A mutating call observed by [`MemoryMailbox`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailboxMutation {
    CreateLabel(String),
    AddLabel { conversation: String, label: String },
    RemoveLabel { conversation: String, label: String },
    Archive(String),
}

struct Thread {
    conversation: Conversation,
    labels: Vec<String>,
    archived: bool,
}

#[derive(Default)]
struct State {
    labels: Vec<String>,
    threads: Vec<Thread>,
    queries: Vec<String>,
    mutations: Vec<MailboxMutation>,
}

/// Mailbox kept entirely in memory.
#[derive(Default)]
pub struct MemoryMailbox {
    state: Mutex<State>,
}

impl MemoryMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a conversation carrying the given labels. Labels are registered
    /// without being recorded as mutations.
    pub fn add_conversation(&self, id: &str, messages: Vec<Message>, labels: &[&str]) {
        if let Ok(mut state) = self.state.lock() {
            for label in labels {
                if !state.labels.iter().any(|l| l == label) {
                    state.labels.push(label.to_string());
                }
            }
            state.threads.push(Thread {
                conversation: Conversation {
                    id: id.to_string(),
                    messages,
                },
                labels: labels.iter().map(|l| l.to_string()).collect(),
                archived: false,
            });
        }
    }

    /// Labels currently attached to a conversation.
    pub fn labels_of(&self, conversation_id: &str) -> Vec<String> {
        self.lock()
            .ok()
            .and_then(|state| {
                state
                    .threads
                    .iter()
                    .find(|t| t.conversation.id == conversation_id)
                    .map(|t| t.labels.clone())
            })
            .unwrap_or_default()
    }

    pub fn is_archived(&self, conversation_id: &str) -> bool {
        self.lock()
            .map(|state| {
                state
                    .threads
                    .iter()
                    .any(|t| t.conversation.id == conversation_id && t.archived)
            })
            .unwrap_or(false)
    }

    /// Whether a label with this exact name exists.
    pub fn has_label(&self, name: &str) -> bool {
        self.lock()
            .map(|state| state.labels.iter().any(|l| l == name))
            .unwrap_or(false)
    }

    /// Every mutating call, in order.
    pub fn mutations(&self) -> Vec<MailboxMutation> {
        self.lock().map(|s| s.mutations.clone()).unwrap_or_default()
    }

    /// Every query passed to [`Mailbox::search`], in order.
    pub fn queries(&self) -> Vec<String> {
        self.lock().map(|s| s.queries.clone()).unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state.lock().map_err(|_| MailboxError::LockPoisoned)
    }

    fn with_thread<F>(&self, conversation: &Conversation, f: F) -> Result<()>
    where
        F: FnOnce(&mut Thread) -> MailboxMutation,
    {
        let mut state = self.lock()?;
        let thread = state
            .threads
            .iter_mut()
            .find(|t| t.conversation.id == conversation.id)
            .ok_or_else(|| MailboxError::ConversationNotFound(conversation.id.clone()))?;
        let mutation = f(thread);
        state.mutations.push(mutation);
        Ok(())
    }
}

impl Mailbox for MemoryMailbox {
    fn find_or_create_label(&self, name: &str) -> Result<LabelHandle> {
        let mut state = self.lock()?;
        if !state.labels.iter().any(|l| l == name) {
            state.labels.push(name.to_string());
            state
                .mutations
                .push(MailboxMutation::CreateLabel(name.to_string()));
        }
        Ok(LabelHandle::new(name))
    }

    fn search(&self, query: &str) -> Result<Vec<Conversation>> {
        let parsed = SearchQuery::parse(query)?;
        let mut state = self.lock()?;
        state.queries.push(query.to_string());
        Ok(state
            .threads
            .iter()
            .filter(|t| parsed.matches(&t.labels, &t.conversation.messages))
            .map(|t| t.conversation.clone())
            .collect())
    }

    fn add_label(&self, conversation: &Conversation, label: &LabelHandle) -> Result<()> {
        self.with_thread(conversation, |thread| {
            if !thread.labels.contains(&label.name) {
                thread.labels.push(label.name.clone());
            }
            MailboxMutation::AddLabel {
                conversation: thread.conversation.id.clone(),
                label: label.name.clone(),
            }
        })
    }

    fn remove_label(&self, conversation: &Conversation, label: &LabelHandle) -> Result<()> {
        self.with_thread(conversation, |thread| {
            thread.labels.retain(|l| l != &label.name);
            MailboxMutation::RemoveLabel {
                conversation: thread.conversation.id.clone(),
                label: label.name.clone(),
            }
        })
    }

    fn archive(&self, conversation: &Conversation) -> Result<()> {
        self.with_thread(conversation, |thread| {
            thread.archived = true;
            MailboxMutation::Archive(thread.conversation.id.clone())
        })
    }
}
