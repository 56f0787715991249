use std::io::Write;
use std::path::{Component, Path, PathBuf};

use log::debug;

use crate::error::StorageError;

use super::{FileHandle, FileStore, FolderHandle};

/// Folder tree on the local filesystem.
///
/// Folder and file ids are `/`-separated paths relative to the root; the root
/// itself has the empty id. Descriptions live in a hidden sidecar file next to
/// the file they describe.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        ensure_directory(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a folder or file id.
    pub fn path_of(&self, id: &str) -> PathBuf {
        if id.is_empty() {
            self.root.clone()
        } else {
            self.root.join(id)
        }
    }

    /// Reads back the description stored for a file, if any.
    pub fn description_of(&self, file: &FileHandle) -> Option<String> {
        std::fs::read_to_string(self.sidecar_path(&file.id)).ok()
    }

    fn sidecar_path(&self, file_id: &str) -> PathBuf {
        let path = self.path_of(file_id);
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        path.with_file_name(format!(".{}.description", name))
    }

    /// Creates `filename` inside `dir` exclusively, falling back to `_2`, `_3`
    /// ... suffixes when the name is taken. Returns the final name.
    fn store_with_atomic_creation(
        &self,
        dir_path: &Path,
        filename: &str,
        content: &[u8],
    ) -> Result<String, StorageError> {
        let (base, ext) = if let Some(dot_pos) = filename.rfind('.').filter(|p| *p > 0) {
            (&filename[..dot_pos], Some(&filename[dot_pos..]))
        } else {
            (filename, None)
        };

        for counter in 1..=1000 {
            let try_filename = if counter == 1 {
                filename.to_string()
            } else {
                match ext {
                    Some(ext) => format!("{}_{}{}", base, counter, ext),
                    None => format!("{}_{}", base, counter),
                }
            };

            let try_path = dir_path.join(&try_filename);

            // create_new fails when the file exists: atomic check-and-create.
            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&try_path)
            {
                Ok(mut file) => {
                    file.write_all(content)
                        .map_err(|e| StorageError::WriteFile {
                            path: try_path.clone(),
                            source: e,
                        })?;
                    return Ok(try_filename);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(StorageError::WriteFile {
                        path: try_path,
                        source: e,
                    });
                }
            }
        }

        Err(StorageError::FileExists(dir_path.join(filename)))
    }
}

impl FileStore for LocalFileStore {
    fn root_folder(&self) -> Result<FolderHandle, StorageError> {
        Ok(FolderHandle {
            id: String::new(),
            name: self
                .root
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string(),
        })
    }

    fn folder_by_id(&self, id: &str) -> Result<FolderHandle, StorageError> {
        let id = id.trim_matches('/');
        if id.is_empty() {
            return self.root_folder();
        }

        let relative = Path::new(id);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::FolderNotFound(id.to_string()));
        }

        if !self.path_of(id).is_dir() {
            return Err(StorageError::FolderNotFound(id.to_string()));
        }

        Ok(FolderHandle {
            id: id.to_string(),
            name: relative
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string(),
        })
    }

    fn find_child_folder(
        &self,
        parent: &FolderHandle,
        name: &str,
    ) -> Result<Option<FolderHandle>, StorageError> {
        let disk_name = disk_name(name)?;
        let id = child_id(&parent.id, &disk_name);
        if self.path_of(&id).is_dir() {
            Ok(Some(FolderHandle {
                id,
                name: name.to_string(),
            }))
        } else {
            Ok(None)
        }
    }

    fn create_folder(
        &self,
        parent: &FolderHandle,
        name: &str,
    ) -> Result<FolderHandle, StorageError> {
        let disk_name = disk_name(name)?;
        let id = child_id(&parent.id, &disk_name);
        ensure_directory(&self.path_of(&id))?;
        debug!("Created folder {}", self.path_of(&id).display());
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
        let disk_name = disk_name(name)?;
        let dir_path = self.path_of(&parent.id);
        if !dir_path.is_dir() {
            return Err(StorageError::FolderNotFound(parent.id.clone()));
        }

        let stored_name = self.store_with_atomic_creation(&dir_path, &disk_name, content)?;
        debug!(
            "Stored {} bytes as {}",
            content.len(),
            dir_path.join(&stored_name).display()
        );

        Ok(FileHandle {
            id: child_id(&parent.id, &stored_name),
            name: stored_name,
        })
    }

    fn set_description(&self, file: &FileHandle, description: &str) -> Result<(), StorageError> {
        if !self.path_of(&file.id).is_file() {
            return Err(StorageError::FileNotFound(file.id.clone()));
        }
        let sidecar = self.sidecar_path(&file.id);
        std::fs::write(&sidecar, description).map_err(|e| StorageError::WriteFile {
            path: sidecar,
            source: e,
        })
    }
}

fn ensure_directory(path: &Path) -> Result<(), StorageError> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| StorageError::CreateDirectory {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

fn child_id(parent_id: &str, name: &str) -> String {
    if parent_id.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent_id, name)
    }
}

/// Maps a store name onto a single path component. Separators become `_`;
/// names that would resolve to the folder itself or its parent are rejected.
fn disk_name(name: &str) -> Result<String, StorageError> {
    let mapped: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' || c == '\0' { '_' } else { c })
        .collect();

    if mapped.trim().is_empty() || mapped == "." || mapped == ".." {
        return Err(StorageError::InvalidName {
            name: name.to_string(),
            reason: "not a usable file or folder name".to_string(),
        });
    }
    Ok(mapped)
}
