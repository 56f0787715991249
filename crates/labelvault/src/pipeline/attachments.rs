use log::debug;

use crate::error::StorageError;
use crate::mailbox::Message;
use crate::sanitize::sanitize_filename;
use crate::storage::{find_or_create_folder, FileStore, FolderHandle};

/// Folder under each label folder that holds per-message attachment folders.
pub const ATTACHMENTS_FOLDER: &str = "PiecesJointes";

/// Name used when an attachment name sanitizes to nothing.
const FALLBACK_ATTACHMENT_NAME: &str = "piece-jointe";

/// Saves a message's regular attachments under
/// `<label folder>/PiecesJointes/<base name>/`.
pub struct AttachmentArchiver<'a> {
    files: &'a dyn FileStore,
}

impl<'a> AttachmentArchiver<'a> {
    pub fn new(files: &'a dyn FileStore) -> Self {
        Self { files }
    }

    /// Returns the number of files written. No folder is created when the
    /// message has no regular attachments; zero-byte parts are skipped.
    pub fn archive(
        &self,
        label_folder: &FolderHandle,
        base_name: &str,
        message: &Message,
    ) -> Result<usize, StorageError> {
        let parts: Vec<_> = message.attachments().collect();
        if parts.is_empty() {
            return Ok(0);
        }

        let container = find_or_create_folder(self.files, label_folder, ATTACHMENTS_FOLDER)?;
        let folder = find_or_create_folder(self.files, &container, base_name)?;

        let mut saved = 0;
        for part in parts {
            if part.data.is_empty() {
                debug!(
                    "Skipping empty attachment '{}' of message {}",
                    part.filename, message.id
                );
                continue;
            }

            let mut name = sanitize_filename(&part.filename);
            if name.is_empty() {
                name = FALLBACK_ATTACHMENT_NAME.to_string();
            }
            self.files.create_file(&folder, &name, &part.data)?;
            saved += 1;
        }

        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailbox::{MessagePart, PartKind};
    use crate::storage::MemoryFileStore;
    use chrono::Utc;

    fn part(name: &str, kind: PartKind, data: &[u8]) -> MessagePart {
        MessagePart {
            filename: name.to_string(),
            mime_type: Some("application/octet-stream".to_string()),
            content_id: None,
            kind,
            data: data.to_vec(),
        }
    }

    fn message(parts: Vec<MessagePart>) -> Message {
        Message {
            id: "m1".to_string(),
            from: String::new(),
            to: String::new(),
            cc: String::new(),
            subject: Some("s".to_string()),
            body_html: String::new(),
            date: Utc::now(),
            unread: true,
            parts,
        }
    }

    #[test]
    fn test_no_attachments_creates_nothing() {
        let store = MemoryFileStore::new();
        let label = store.root_folder().unwrap();
        let archiver = AttachmentArchiver::new(&store);

        let only_inline = message(vec![part("logo.png", PartKind::Inline, b"png")]);
        assert_eq!(archiver.archive(&label, "base", &only_inline).unwrap(), 0);
        assert_eq!(store.folder_count(), 0);
        assert_eq!(store.file_count(), 0);
    }

    #[test]
    fn test_saves_attachments_and_skips_empty() {
        let store = MemoryFileStore::new();
        let root = store.root_folder().unwrap();
        let label = store.create_folder(&root, "PDF").unwrap();
        let archiver = AttachmentArchiver::new(&store);

        let m = message(vec![
            part("report.pdf", PartKind::Attachment, b"%PDF"),
            part("empty.txt", PartKind::Attachment, b""),
            part("a:b.txt", PartKind::Attachment, b"x"),
        ]);

        assert_eq!(archiver.archive(&label, "base", &m).unwrap(), 2);

        let files = store.files_at(&["PDF", ATTACHMENTS_FOLDER, "base"]);
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["report.pdf", "a_b.txt"]);
    }

    #[test]
    fn test_only_empty_attachments_still_creates_folder() {
        let store = MemoryFileStore::new();
        let root = store.root_folder().unwrap();
        let archiver = AttachmentArchiver::new(&store);

        let m = message(vec![part("empty.txt", PartKind::Attachment, b"")]);

        assert_eq!(archiver.archive(&root, "base", &m).unwrap(), 0);
        assert!(store.folder_at(&[ATTACHMENTS_FOLDER, "base"]).is_some());
        assert_eq!(store.file_count(), 0);
    }

    #[test]
    fn test_reuses_container_folder() {
        let store = MemoryFileStore::new();
        let root = store.root_folder().unwrap();
        let archiver = AttachmentArchiver::new(&store);

        let m = message(vec![part("a.txt", PartKind::Attachment, b"a")]);
        archiver.archive(&root, "first", &m).unwrap();
        archiver.archive(&root, "second", &m).unwrap();

        assert_eq!(store.folder_count(), 3);
    }
}
