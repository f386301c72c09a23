use std::path::PathBuf;

use serde::Serialize;

use super::config::NotebookConfig;
use super::note::{Note, NoteId};

/// Where notes are persisted for this session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Notes live only in the local store
    Guest,
    /// The server's list is authoritative
    Authenticated,
}

/// A loaded notebook: config plus the session's in-memory note list
#[derive(Debug)]
pub struct Notebook {
    /// Directory containing `quill/`
    pub root: PathBuf,
    /// Path to the `quill/` directory
    pub dir: PathBuf,
    /// Parsed quill.toml
    pub config: NotebookConfig,
    /// Every note of the session, in display order
    pub notes: Vec<Note>,
}

impl Notebook {
    pub fn mode(&self) -> Mode {
        if self.config.remote.is_authenticated() {
            Mode::Authenticated
        } else {
            Mode::Guest
        }
    }

    pub fn find(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn position(&self, id: NoteId) -> Option<usize> {
        self.notes.iter().position(|n| n.id == id)
    }

    pub fn contains(&self, id: NoteId) -> bool {
        self.position(id).is_some()
    }

    pub fn name(&self) -> &str {
        if self.config.notebook.name.is_empty() {
            self.root
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("notes")
        } else {
            &self.config.notebook.name
        }
    }
}
