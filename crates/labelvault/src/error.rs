use std::path::PathBuf;
use thiserror::Error;

pub use crate::mailbox::MailboxError;

#[derive(Error, Debug)]
pub enum ArchiverError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Mailbox error: {0}")]
    Mailbox(#[from] MailboxError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] crate::pipeline::PipelineError),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("Logging setup failed: {0}")]
    Telemetry(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("File already exists: {0}")]
    FileExists(PathBuf),

    #[error("File store lock poisoned")]
    LockPoisoned,
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to start PDF backend '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF backend I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF backend '{program}' exited with {status}: {stderr}")]
    BackendFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("PDF backend produced invalid output: {0}")]
    InvalidOutput(String),
}

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Property store error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Property store lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, ArchiverError>;
