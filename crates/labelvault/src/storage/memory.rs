//! In-process file store.
//!
//! Like hosted document stores, sibling folders and files may share a name.

use std::sync::{Mutex, MutexGuard};

use crate::error::StorageError;

use super::{FileHandle, FileStore, FolderHandle};

const ROOT_ID: &str = "root";

/// A file held by [`MemoryFileStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    pub content: Vec<u8>,
    pub description: Option<String>,
}

struct Folder {
    id: String,
    parent: String,
    name: String,
}

#[derive(Default)]
struct Tree {
    folders: Vec<Folder>,
    files: Vec<(String, StoredFile)>,
    next_id: u64,
}

/// File store kept entirely in memory.
#[derive(Default)]
pub struct MemoryFileStore {
    tree: Mutex<Tree>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of folders, not counting the root.
    pub fn folder_count(&self) -> usize {
        self.tree.lock().map(|t| t.folders.len()).unwrap_or(0)
    }

    pub fn file_count(&self) -> usize {
        self.tree.lock().map(|t| t.files.len()).unwrap_or(0)
    }

    /// Resolves a path of folder names from the root, following first matches.
    pub fn folder_at(&self, path: &[&str]) -> Option<FolderHandle> {
        let tree = self.tree.lock().ok()?;
        let mut current = FolderHandle {
            id: ROOT_ID.to_string(),
            name: String::new(),
        };
        for name in path {
            let folder = tree
                .folders
                .iter()
                .find(|f| f.parent == current.id && f.name == *name)?;
            current = FolderHandle {
                id: folder.id.clone(),
                name: folder.name.clone(),
            };
        }
        Some(current)
    }

    /// Files directly inside the folder at `path`, in creation order.
    pub fn files_at(&self, path: &[&str]) -> Vec<StoredFile> {
        let Some(folder) = self.folder_at(path) else {
            return Vec::new();
        };
        self.tree
            .lock()
            .map(|t| {
                t.files
                    .iter()
                    .filter(|(parent, _)| *parent == folder.id)
                    .map(|(_, file)| file.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tree>, StorageError> {
        self.tree.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

impl Tree {
    fn allocate_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn folder(&self, id: &str) -> Option<FolderHandle> {
        if id == ROOT_ID {
            return Some(FolderHandle {
                id: ROOT_ID.to_string(),
                name: String::new(),
            });
        }
        self.folders.iter().find(|f| f.id == id).map(|f| FolderHandle {
            id: f.id.clone(),
            name: f.name.clone(),
        })
    }
}

impl FileStore for MemoryFileStore {
    fn root_folder(&self) -> Result<FolderHandle, StorageError> {
        self.folder_by_id(ROOT_ID)
    }

    fn folder_by_id(&self, id: &str) -> Result<FolderHandle, StorageError> {
        self.lock()?
            .folder(id)
            .ok_or_else(|| StorageError::FolderNotFound(id.to_string()))
    }

    fn find_child_folder(
        &self,
        parent: &FolderHandle,
        name: &str,
    ) -> Result<Option<FolderHandle>, StorageError> {
        let tree = self.lock()?;
        Ok(tree
            .folders
            .iter()
            .find(|f| f.parent == parent.id && f.name == name)
            .map(|f| FolderHandle {
                id: f.id.clone(),
                name: f.name.clone(),
            }))
    }

    fn create_folder(
        &self,
        parent: &FolderHandle,
        name: &str,
    ) -> Result<FolderHandle, StorageError> {
        let mut tree = self.lock()?;
        if tree.folder(&parent.id).is_none() {
            return Err(StorageError::FolderNotFound(parent.id.clone()));
        }
        let id = tree.allocate_id("folder");
        tree.folders.push(Folder {
            id: id.clone(),
            parent: parent.id.clone(),
            name: name.to_string(),
        });
        Ok(FolderHandle {
            id,
            name: name.to_string(),
        })
    }

    fn create_file(
        &self,
        parent: &FolderHandle,
        name: &str,
        content: &[u8],
    ) -> Result<FileHandle, StorageError> {
        let mut tree = self.lock()?;
        if tree.folder(&parent.id).is_none() {
            return Err(StorageError::FolderNotFound(parent.id.clone()));
        }
        let id = tree.allocate_id("file");
        tree.files.push((
            parent.id.clone(),
            StoredFile {
                id: id.clone(),
                name: name.to_string(),
                content: content.to_vec(),
                description: None,
            },
        ));
        Ok(FileHandle {
            id,
            name: name.to_string(),
        })
    }

    fn set_description(&self, file: &FileHandle, description: &str) -> Result<(), StorageError> {
        let mut tree = self.lock()?;
        let stored = tree
            .files
            .iter_mut()
            .map(|(_, f)| f)
            .find(|f| f.id == file.id)
            .ok_or_else(|| StorageError::FileNotFound(file.id.clone()))?;
        stored.description = Some(description.to_string());
        Ok(())
    }
}
