//! Tracking of archived messages per label.

use log::debug;

use crate::error::StateError;

use super::PropertyStore;

/// Prefix shared by every processed-record key.
const KEY_PREFIX: &str = "traite";
/// Value written for a processed record; only its presence matters.
const PROCESSED_VALUE: &str = "1";

/// Tracks which message ids have been archived for one label.
///
/// Records are never expired or deleted.
pub struct ProcessedStateStore<'a> {
    store: &'a dyn PropertyStore,
    label: String,
}

impl<'a> ProcessedStateStore<'a> {
    pub fn new(store: &'a dyn PropertyStore, label: impl Into<String>) -> Self {
        Self {
            store,
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Checks if a message has already been archived under this label.
    pub fn is_processed(&self, message_id: &str) -> Result<bool, StateError> {
        Ok(self.store.get(&self.key(message_id))?.is_some())
    }

    /// Records that a message has been archived under this label.
    pub fn mark_processed(&self, message_id: &str) -> Result<(), StateError> {
        self.store.set(&self.key(message_id), PROCESSED_VALUE)?;
        debug!(
            "Marked message {} as processed for label '{}'",
            message_id, self.label
        );
        Ok(())
    }

    fn key(&self, message_id: &str) -> String {
        make_key(&self.label, message_id)
    }
}

/// Builds the property key for a `(label, message id)` record.
pub fn make_key(label: &str, message_id: &str) -> String {
    format!("{}:{}:{}", KEY_PREFIX, label, message_id)
}
