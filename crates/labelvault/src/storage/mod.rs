//! Hierarchical file store abstraction and folder resolution.

pub mod filesystem;
pub mod memory;

use log::debug;

use crate::error::StorageError;

pub use filesystem::LocalFileStore;
pub use memory::{MemoryFileStore, StoredFile};

/// Reference to a folder owned by a [`FileStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderHandle {
    pub id: String,
    pub name: String,
}

/// Reference to a file owned by a [`FileStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub id: String,
    pub name: String,
}

/// The destination store PDFs and attachments are written to.
pub trait FileStore: Send + Sync {
    fn root_folder(&self) -> Result<FolderHandle, StorageError>;

    fn folder_by_id(&self, id: &str) -> Result<FolderHandle, StorageError>;

    /// First child folder of `parent` with exactly this name.
    fn find_child_folder(
        &self,
        parent: &FolderHandle,
        name: &str,
    ) -> Result<Option<FolderHandle>, StorageError>;

    fn create_folder(&self, parent: &FolderHandle, name: &str)
        -> Result<FolderHandle, StorageError>;

    fn create_file(
        &self,
        parent: &FolderHandle,
        name: &str,
        content: &[u8],
    ) -> Result<FileHandle, StorageError>;

    fn set_description(&self, file: &FileHandle, description: &str) -> Result<(), StorageError>;
}

/// Returns the child folder named `name`, creating it when absent.
///
/// Re-running never creates a second folder with the same name; when the
/// store already holds duplicates the first match is used.
pub fn find_or_create_folder(
    store: &dyn FileStore,
    parent: &FolderHandle,
    name: &str,
) -> Result<FolderHandle, StorageError> {
    if let Some(existing) = store.find_child_folder(parent, name)? {
        return Ok(existing);
    }
    debug!("Creating folder '{}' under '{}'", name, parent.name);
    store.create_folder(parent, name)
}

/// Resolves the configured destination root, or the store root when none is set.
pub fn resolve_root(
    store: &dyn FileStore,
    root_folder_id: Option<&str>,
) -> Result<FolderHandle, StorageError> {
    match root_folder_id {
        Some(id) => store.folder_by_id(id),
        None => store.root_folder(),
    }
}
