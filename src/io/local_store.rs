use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::io::notebook_io::NotebookError;
use crate::model::note::Note;

/// File holding the guest-mode note array
pub const NOTES_FILE: &str = "notes.json";

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// The local-storage key: one JSON array of notes.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// Store inside the given `quill/` directory
    pub fn in_dir(notebook_dir: &Path) -> Self {
        LocalStore {
            path: notebook_dir.join(NOTES_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every stored note. A missing file is an empty list; a file that
    /// doesn't parse is backed up as `notes.json.bak` and treated as empty.
    /// A failed backup is an error so nothing overwrites the only copy.
    pub fn load(&self) -> Result<Vec<Note>, NotebookError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path).map_err(|e| NotebookError::ReadError {
            path: self.path.clone(),
            source: e,
        })?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Vec<Note>>(&text) {
            Ok(notes) => Ok(notes),
            Err(e) => {
                let bak = self.path.with_extension("json.bak");
                if let Err(source) = fs::copy(&self.path, &bak) {
                    tracing::error!(backup = %bak.display(), error = %source, "could not back up local notes");
                    return Err(NotebookError::WriteError { path: bak, source });
                }
                tracing::warn!(
                    path = %self.path.display(),
                    backup = %bak.display(),
                    error = %e,
                    "could not parse local notes, starting empty"
                );
                Ok(Vec::new())
            }
        }
    }

    /// The stored bytes exactly as on disk, `None` when there is no file
    pub fn read_raw(&self) -> Result<Option<Vec<u8>>, NotebookError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(NotebookError::ReadError {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    /// Put back bytes from [`read_raw`](Self::read_raw) untouched
    pub fn write_raw(&self, bytes: &[u8]) -> Result<(), NotebookError> {
        atomic_write(&self.path, bytes).map_err(|e| NotebookError::WriteError {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Replace the stored array
    pub fn save(&self, notes: &[Note]) -> Result<(), NotebookError> {
        let content = serde_json::to_string_pretty(notes)?;
        atomic_write(&self.path, content.as_bytes()).map_err(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "local note write failed");
            NotebookError::WriteError {
                path: self.path.clone(),
                source: e,
            }
        })
    }

    /// Remove the key entirely
    pub fn clear(&self) -> Result<(), NotebookError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(NotebookError::WriteError {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::note::{DEFAULT_CATEGORY, NoteId};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample(id: i64) -> Note {
        Note {
            id: NoteId(id),
            title: format!("Note {}", id),
            content: "body".into(),
            category: DEFAULT_CATEGORY.into(),
            reminder_date: None,
            is_pinned: id % 2 == 0,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::in_dir(tmp.path());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::in_dir(tmp.path());
        let notes = vec![sample(1), sample(2)];
        store.save(&notes).unwrap();
        assert_eq!(store.load().unwrap(), notes);
    }

    #[test]
    fn malformed_file_is_backed_up() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::in_dir(tmp.path());
        fs::write(store.path(), "[{ not json").unwrap();
        assert!(store.load().unwrap().is_empty());
        let bak = tmp.path().join("notes.json.bak");
        assert_eq!(fs::read_to_string(bak).unwrap(), "[{ not json");
    }

    #[test]
    fn failed_backup_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::in_dir(tmp.path());
        fs::write(store.path(), "[{ not json").unwrap();
        // A directory in the way makes the copy fail
        fs::create_dir(tmp.path().join("notes.json.bak")).unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, NotebookError::WriteError { .. }));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "[{ not json");
    }

    #[test]
    fn raw_bytes_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::in_dir(tmp.path());
        assert_eq!(store.read_raw().unwrap(), None);
        store.write_raw(b"[ {\"id\": 1} ]").unwrap();
        assert_eq!(store.read_raw().unwrap().unwrap(), b"[ {\"id\": 1} ]");
    }

    #[test]
    fn clear_removes_file_and_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::in_dir(tmp.path());
        store.save(&[sample(1)]).unwrap();
        store.clear().unwrap();
        assert!(!store.path().exists());
        store.clear().unwrap();
    }
}
