pub mod config;
pub mod db;
pub mod error;
pub mod local;
pub mod mailbox;
pub mod pipeline;
pub mod render;
pub mod sanitize;
pub mod scheduler;
pub mod state;
pub mod storage;
pub mod telemetry;

pub use config::{load_config, ArchiveConfig, Config};
pub use error::{ArchiverError, ConfigError, RenderError, Result, StateError, StorageError};
pub use local::LocalStack;
pub use mailbox::{Conversation, LabelHandle, Mailbox, MailboxError, Message, MessagePart, PartKind};
pub use pipeline::{
    run_all_labels, LabelProcessor, LabelReport, MessageOutcome, PipelineError, RunReport, Services,
};
pub use render::{CommandPdfBackend, PdfBackend, PdfRenderer};
pub use scheduler::{InstallOutcome, TriggerScheduler};
pub use state::{MemoryPropertyStore, ProcessedStateStore, PropertyStore, SqlitePropertyStore};
pub use storage::{FileStore, FolderHandle, LocalFileStore, MemoryFileStore};
