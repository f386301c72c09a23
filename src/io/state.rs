use std::fs;
use std::path::Path;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::io::local_store::atomic_write;
use crate::model::note::NoteId;

/// Persisted UI state (written to .state.json)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UiState {
    /// Bulk selection, in the order notes were ticked
    #[serde(default)]
    pub selected: IndexSet<NoteId>,
    /// Note shown in the detail view
    #[serde(default)]
    pub current: Option<NoteId>,
    /// Last search term
    #[serde(default)]
    pub last_search: Option<String>,
}

/// Read .state.json from the notebook directory
pub fn read_ui_state(notebook_dir: &Path) -> Option<UiState> {
    let path = notebook_dir.join(".state.json");
    let content = fs::read_to_string(&path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Write .state.json to the notebook directory
pub fn write_ui_state(notebook_dir: &Path, state: &UiState) -> Result<(), std::io::Error> {
    let path = notebook_dir.join(".state.json");
    let content = serde_json::to_string_pretty(state)?;
    atomic_write(&path, content.as_bytes())
}
