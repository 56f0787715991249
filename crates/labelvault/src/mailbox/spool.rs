//! Mailbox backed by a spool directory on the local filesystem.
//!
//! Layout:
//!
//! ```text
//! <root>/labels.json               {"labels": ["PDF", "PDF/Traité"]}
//! <root>/<conversation>/thread.json {"labels": [...], "archived": false, "unread": [...]}
//! <root>/<conversation>/<message-id>.eml
//! ```

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, info, warn};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::error::{MailboxError, Result};
use super::parser::parse_message;
use super::query::SearchQuery;
use super::{Conversation, LabelHandle, Mailbox, Message};

const LABELS_FILE: &str = "labels.json";
const THREAD_FILE: &str = "thread.json";
const MESSAGE_EXTENSION: &str = "eml";

#[derive(Debug, Default, Serialize, Deserialize)]
struct LabelRegistry {
    #[serde(default)]
    labels: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ThreadState {
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    unread: Vec<String>,
}

/// Mailbox stored as a directory of conversations holding `.eml` files.
pub struct SpoolMailbox {
    root: PathBuf,
    // Serializes read-modify-write cycles on the JSON state files.
    write_lock: Mutex<()>,
}

impl SpoolMailbox {
    /// Opens (or creates) a spool rooted at `root`.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root).map_err(|e| MailboxError::Io {
            path: root.clone(),
            source: e,
        })?;
        info!("Mailbox spool opened at {}", root.display());
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stores a raw message in a conversation, creating the conversation when
    /// needed. The labels are attached to the conversation and registered.
    pub fn deliver(
        &self,
        conversation_id: &str,
        message_id: &str,
        raw: &[u8],
        labels: &[&str],
        unread: bool,
    ) -> Result<()> {
        validate_component(conversation_id)?;
        validate_component(message_id)?;
        // Reject garbage before it lands in the spool.
        parse_message(message_id, raw, unread)?;

        let _guard = self.write_lock.lock().map_err(|_| MailboxError::LockPoisoned)?;

        let dir = self.root.join(conversation_id);
        std::fs::create_dir_all(&dir).map_err(|e| MailboxError::Io {
            path: dir.clone(),
            source: e,
        })?;

        let message_path = dir.join(format!("{}.{}", message_id, MESSAGE_EXTENSION));
        std::fs::write(&message_path, raw).map_err(|e| MailboxError::Io {
            path: message_path.clone(),
            source: e,
        })?;

        let mut registry: LabelRegistry = read_json(&self.root.join(LABELS_FILE))?;
        let mut thread: ThreadState = read_json(&dir.join(THREAD_FILE))?;
        for label in labels {
            if !registry.labels.iter().any(|l| l == label) {
                registry.labels.push(label.to_string());
            }
            if !thread.labels.iter().any(|l| l == label) {
                thread.labels.push(label.to_string());
            }
        }
        thread.unread.retain(|id| id != message_id);
        if unread {
            thread.unread.push(message_id.to_string());
        }
        write_json(&self.root.join(LABELS_FILE), &registry)?;
        write_json(&dir.join(THREAD_FILE), &thread)?;

        debug!(
            "Delivered message {} into conversation {}",
            message_id, conversation_id
        );
        Ok(())
    }

    /// Labels currently attached to a conversation.
    pub fn labels_of(&self, conversation_id: &str) -> Result<Vec<String>> {
        let state: ThreadState = read_json(&self.root.join(conversation_id).join(THREAD_FILE))?;
        Ok(state.labels)
    }

    pub fn is_archived(&self, conversation_id: &str) -> Result<bool> {
        let state: ThreadState = read_json(&self.root.join(conversation_id).join(THREAD_FILE))?;
        Ok(state.archived)
    }

    fn conversation_dirs(&self) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| MailboxError::Io {
            path: self.root.clone(),
            source: e,
        })?;

        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| MailboxError::Io {
                path: self.root.clone(),
                source: e,
            })?;
            let path = entry.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    fn load_messages(&self, dir: &Path, state: &ThreadState) -> Result<Vec<Message>> {
        let entries = std::fs::read_dir(dir).map_err(|e| MailboxError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut messages = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| MailboxError::Io {
                    path: dir.to_path_buf(),
                    source: e,
                })?
                .path();
            if path.extension().and_then(|e| e.to_str()) != Some(MESSAGE_EXTENSION) {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                warn!("Skipping message file with non UTF-8 name: {}", path.display());
                continue;
            };
            let raw = std::fs::read(&path).map_err(|e| MailboxError::Io {
                path: path.clone(),
                source: e,
            })?;
            let unread = state.unread.iter().any(|u| u == id);
            match parse_message(id, &raw, unread) {
                Ok(message) => messages.push(message),
                Err(e) => warn!("Skipping unreadable message {}: {}", path.display(), e),
            }
        }

        messages.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(messages)
    }

    fn update_thread<F>(&self, conversation: &Conversation, f: F) -> Result<()>
    where
        F: FnOnce(&mut ThreadState),
    {
        let _guard = self.write_lock.lock().map_err(|_| MailboxError::LockPoisoned)?;
        let dir = self.root.join(&conversation.id);
        if !dir.is_dir() {
            return Err(MailboxError::ConversationNotFound(conversation.id.clone()));
        }
        let path = dir.join(THREAD_FILE);
        let mut state: ThreadState = read_json(&path)?;
        f(&mut state);
        write_json(&path, &state)
    }
}

impl Mailbox for SpoolMailbox {
    fn find_or_create_label(&self, name: &str) -> Result<LabelHandle> {
        if name.trim().is_empty() {
            return Err(MailboxError::Label(
                name.to_string(),
                "label name is blank".to_string(),
            ));
        }

        let _guard = self.write_lock.lock().map_err(|_| MailboxError::LockPoisoned)?;
        let path = self.root.join(LABELS_FILE);
        let mut registry: LabelRegistry = read_json(&path)?;
        if !registry.labels.iter().any(|l| l == name) {
            registry.labels.push(name.to_string());
            write_json(&path, &registry)?;
            info!("Created label '{}'", name);
        }
        Ok(LabelHandle::new(name))
    }

    fn search(&self, query: &str) -> Result<Vec<Conversation>> {
        let parsed = SearchQuery::parse(query)?;

        let mut found = Vec::new();
        for dir in self.conversation_dirs()? {
            let state: ThreadState = read_json(&dir.join(THREAD_FILE))?;
            if let Some(label) = &parsed.label {
                if !state.labels.contains(label) {
                    continue;
                }
            }

            let messages = self.load_messages(&dir, &state)?;
            if !parsed.matches(&state.labels, &messages) {
                continue;
            }

            let id = dir
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            found.push(Conversation { id, messages });
        }

        debug!("Query {} matched {} conversations", query, found.len());
        Ok(found)
    }

    fn add_label(&self, conversation: &Conversation, label: &LabelHandle) -> Result<()> {
        self.update_thread(conversation, |state| {
            if !state.labels.contains(&label.name) {
                state.labels.push(label.name.clone());
            }
        })
    }

    fn remove_label(&self, conversation: &Conversation, label: &LabelHandle) -> Result<()> {
        self.update_thread(conversation, |state| {
            state.labels.retain(|l| l != &label.name);
        })
    }

    fn archive(&self, conversation: &Conversation) -> Result<()> {
        self.update_thread(conversation, |state| state.archived = true)
    }
}

/// Rejects ids that would escape the spool directory.
fn validate_component(id: &str) -> Result<()> {
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
        return Err(MailboxError::State {
            path: PathBuf::from(id),
            reason: "invalid identifier".to_string(),
        });
    }
    Ok(())
}

/// Reads a JSON state file; a missing file yields the default value.
fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    match std::fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| MailboxError::State {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(MailboxError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|e| MailboxError::State {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    std::fs::write(path, bytes).map_err(|e| MailboxError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
