use thiserror::Error;

use crate::error::{MailboxError, RenderError, StateError, StorageError};

/// Failure of one step of the archival pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Mailbox operation failed: {0}")]
    Mailbox(#[from] MailboxError),

    #[error("Storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("State tracking failed: {0}")]
    State(#[from] StateError),
}
