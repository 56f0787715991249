//! The archival pipeline: per-label processing and the run-all entry point.

pub mod attachments;
pub mod error;
pub mod outcome;
pub mod processor;
pub mod runner;

use crate::mailbox::Mailbox;
use crate::render::PdfBackend;
use crate::state::PropertyStore;
use crate::storage::FileStore;

pub use attachments::{AttachmentArchiver, ATTACHMENTS_FOLDER};
pub use error::PipelineError;
pub use outcome::{LabelFailure, LabelReport, MessageOutcome, MessageReport, RunReport};
pub use processor::LabelProcessor;
pub use runner::run_all_labels;

/// The external collaborators a run works against.
#[derive(Clone, Copy)]
pub struct Services<'a> {
    pub mailbox: &'a dyn Mailbox,
    pub files: &'a dyn FileStore,
    pub properties: &'a dyn PropertyStore,
    pub pdf: &'a dyn PdfBackend,
}
