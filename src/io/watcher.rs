use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::io::local_store::NOTES_FILE;
use crate::io::notebook_io::CONFIG_FILE;

/// Events sent from the file watcher to the TUI event loop.
#[derive(Debug, PartialEq, Eq)]
pub enum FileEvent {
    /// `notes.json` was written by another process
    NotesChanged,
    /// `quill.toml` changed (login/logout from the CLI)
    ConfigChanged,
}

/// Watches the `quill/` directory for files another `ql` process rewrote.
pub struct NotebookWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<FileEvent>,
}

/// Map a changed path to the event it means, if any
fn classify(path: &Path, notebook_dir: &Path) -> Option<FileEvent> {
    if path.parent() != Some(notebook_dir) {
        return None;
    }
    match path.file_name().and_then(|n| n.to_str()) {
        Some(NOTES_FILE) => Some(FileEvent::NotesChanged),
        Some(CONFIG_FILE) => Some(FileEvent::ConfigChanged),
        _ => None,
    }
}

impl NotebookWatcher {
    /// Start watching the given `quill/` directory.
    /// `poll()` should be called each tick.
    pub fn start(notebook_dir: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let dir: PathBuf = notebook_dir.to_path_buf();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(_) => return,
                };
                match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
                    _ => return,
                }
                for path in &event.paths {
                    if let Some(evt) = classify(path, &dir) {
                        let _ = tx.send(evt);
                    }
                }
            },
            Config::default(),
        )?;

        watcher.watch(notebook_dir, RecursiveMode::NonRecursive)?;
        Ok(NotebookWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Drain pending events, collapsing duplicates.
    pub fn poll(&self) -> Vec<FileEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.rx.try_recv() {
            if !events.contains(&evt) {
                events.push(evt);
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_paths() {
        let dir = Path::new("/n/quill");
        assert_eq!(
            classify(&dir.join("notes.json"), dir),
            Some(FileEvent::NotesChanged)
        );
        assert_eq!(
            classify(&dir.join("quill.toml"), dir),
            Some(FileEvent::ConfigChanged)
        );
        assert_eq!(classify(&dir.join(".state.json"), dir), None);
        assert_eq!(classify(&dir.join(".lock"), dir), None);
        assert_eq!(classify(Path::new("/elsewhere/notes.json"), dir), None);
    }
}
