use std::path::Path;

use crate::io::local_store::LocalStore;
use crate::io::notebook_io::{self, NOTEBOOK_DIR, NotebookError};
use crate::io::remote::{HttpBackend, NoteBackend, RemoteError};
use crate::io::state::{UiState, read_ui_state, write_ui_state};
use crate::model::note::{Note, NoteId};
use crate::model::notebook::{Mode, Notebook};
use crate::ops::note_ops::sort_notes;
use crate::ops::selection::Selection;
use crate::ops::sync::{self, HandoffOutcome};

/// Error type for opening a session
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Notebook(#[from] NotebookError),
    #[error("could not load notes from server: {0}")]
    Remote(#[from] RemoteError),
}

/// Everything one run of `ql` works on: the notebook, where its notes are
/// persisted, and the UI state (selection and detail note).
pub struct Session {
    pub notebook: Notebook,
    pub store: LocalStore,
    /// Present in authenticated mode
    pub backend: Option<Box<dyn NoteBackend>>,
    pub selection: Selection,
    /// Note shown in the detail view
    pub current: Option<NoteId>,
    pub last_search: Option<String>,
}

impl Session {
    /// Open the notebook under `root`.
    ///
    /// In guest mode the notes come from the local store. In authenticated
    /// mode any guest notes are handed off to the server first, then the
    /// server's list is used.
    pub fn open(root: &Path) -> Result<(Session, Option<HandoffOutcome>), SessionError> {
        let config = notebook_io::read_config(root)?;
        let dir = root.join(NOTEBOOK_DIR);
        let store = LocalStore::in_dir(&dir);
        let backend: Option<Box<dyn NoteBackend>> = HttpBackend::from_config(&config.remote)
            .map(|b| Box::new(b) as Box<dyn NoteBackend>);
        let notebook = Notebook {
            root: root.to_path_buf(),
            dir,
            config,
            notes: Vec::new(),
        };
        Session::start(notebook, store, backend)
    }

    /// Load notes for a notebook whose storage is already decided.
    pub fn start(
        notebook: Notebook,
        store: LocalStore,
        backend: Option<Box<dyn NoteBackend>>,
    ) -> Result<(Session, Option<HandoffOutcome>), SessionError> {
        let mut session = Session {
            notebook,
            store,
            backend,
            selection: Selection::default(),
            current: None,
            last_search: None,
        };

        let outcome = session.load_notes()?;
        session.restore_ui_state();
        Ok((session, outcome))
    }

    pub fn mode(&self) -> Mode {
        if self.backend.is_some() {
            Mode::Authenticated
        } else {
            Mode::Guest
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notebook.notes
    }

    pub fn find(&self, id: NoteId) -> Option<&Note> {
        self.notebook.find(id)
    }

    /// (Re)load the note list from wherever this session keeps notes.
    pub fn load_notes(&mut self) -> Result<Option<HandoffOutcome>, SessionError> {
        let (notes, outcome) = match self.backend.as_deref() {
            None => (self.store.load()?, None),
            Some(backend) => {
                let outcome = sync::handoff(&self.store, backend)?;
                let notes = match &outcome {
                    HandoffOutcome::Synced { notes, .. } => notes.clone(),
                    _ => backend.fetch_notes("")?,
                };
                (notes, Some(outcome))
            }
        };
        self.replace_notes(notes);
        Ok(outcome)
    }

    /// Swap in a new authoritative list, dropping UI references to notes
    /// that no longer exist.
    pub fn replace_notes(&mut self, mut notes: Vec<Note>) {
        sort_notes(&mut notes);
        self.notebook.notes = notes;
        self.prune_ui_refs();
    }

    fn prune_ui_refs(&mut self) {
        let notebook = &self.notebook;
        self.selection.prune(|id| notebook.contains(id));
        if let Some(id) = self.current
            && !notebook.contains(id)
        {
            self.current = None;
        }
    }

    fn restore_ui_state(&mut self) {
        let Some(state) = read_ui_state(&self.notebook.dir) else {
            return;
        };
        self.selection = Selection::from_ids(state.selected);
        self.current = state.current;
        self.last_search = state.last_search;
        self.prune_ui_refs();
    }

    /// Persist selection, detail note and last search to .state.json
    pub fn save_ui_state(&self) -> Result<(), std::io::Error> {
        let state = UiState {
            selected: self.selection.as_set().clone(),
            current: self.current,
            last_search: self.last_search.clone(),
        };
        write_ui_state(&self.notebook.dir, &state)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::RefCell;
    use std::path::Path;

    use super::*;
    use crate::io::remote::SyncReply;
    use crate::model::config::NotebookConfig;
    use crate::model::note::{DEFAULT_CATEGORY, NotePayload};

    /// In-memory server. Each call is recorded; `fail` makes every call
    /// fail and `fail_sync` only the batch upload.
    #[derive(Default)]
    pub struct FakeBackend {
        pub notes: RefCell<Vec<Note>>,
        pub calls: RefCell<Vec<String>>,
        pub fail: bool,
        pub fail_sync: bool,
        pub next_id: RefCell<i64>,
    }

    impl FakeBackend {
        pub fn with_notes(notes: Vec<Note>) -> Self {
            FakeBackend {
                notes: RefCell::new(notes),
                next_id: RefCell::new(100),
                ..Default::default()
            }
        }

        pub fn failing() -> Self {
            FakeBackend {
                fail: true,
                ..Default::default()
            }
        }

        fn check(&self, call: String) -> Result<(), RemoteError> {
            self.calls.borrow_mut().push(call);
            if self.fail {
                Err(RemoteError::Rejected("boom".into()))
            } else {
                Ok(())
            }
        }

        fn stored(&self, id: i64, p: &NotePayload) -> Note {
            Note {
                id: NoteId(id),
                title: p.title.clone(),
                content: p.content.clone(),
                category: p.category.clone(),
                reminder_date: crate::model::note::parse_reminder(&p.reminder_date),
                is_pinned: p.is_pinned,
                created_at: Some(chrono::Utc::now()),
                updated_at: Some(chrono::Utc::now()),
            }
        }
    }

    impl NoteBackend for FakeBackend {
        fn fetch_notes(&self, query: &str) -> Result<Vec<Note>, RemoteError> {
            self.check(format!("fetch {}", query))?;
            let q = query.to_lowercase();
            Ok(self
                .notes
                .borrow()
                .iter()
                .filter(|n| crate::ops::search::matches(n, &q))
                .cloned()
                .collect())
        }

        fn create_note(&self, payload: &NotePayload) -> Result<Note, RemoteError> {
            self.check(format!("create {}", payload.title))?;
            let id = {
                let mut next = self.next_id.borrow_mut();
                *next += 1;
                *next
            };
            let note = self.stored(id, payload);
            self.notes.borrow_mut().push(note.clone());
            Ok(note)
        }

        fn update_note(
            &self,
            id: NoteId,
            payload: &NotePayload,
        ) -> Result<Option<Note>, RemoteError> {
            self.check(format!("update {}", id))?;
            let note = self.stored(id.0, payload);
            let mut notes = self.notes.borrow_mut();
            if let Some(slot) = notes.iter_mut().find(|n| n.id == id) {
                *slot = note.clone();
            }
            Ok(Some(note))
        }

        fn delete_note(&self, id: NoteId) -> Result<(), RemoteError> {
            self.check(format!("delete {}", id))?;
            self.notes.borrow_mut().retain(|n| n.id != id);
            Ok(())
        }

        fn sync_notes(&self, notes: &[Note]) -> Result<SyncReply, RemoteError> {
            self.check(format!("sync {}", notes.len()))?;
            if self.fail_sync {
                return Err(RemoteError::Rejected("sync refused".into()));
            }
            for n in notes {
                let id = {
                    let mut next = self.next_id.borrow_mut();
                    *next += 1;
                    *next
                };
                let stored = self.stored(id, &n.to_draft().to_payload());
                self.notes.borrow_mut().push(stored);
            }
            Ok(SyncReply {
                synced_count: notes.len(),
                cloud_notes: self.notes.borrow().clone(),
            })
        }
    }

    impl NoteBackend for std::rc::Rc<FakeBackend> {
        fn fetch_notes(&self, query: &str) -> Result<Vec<Note>, RemoteError> {
            (**self).fetch_notes(query)
        }
        fn create_note(&self, payload: &NotePayload) -> Result<Note, RemoteError> {
            (**self).create_note(payload)
        }
        fn update_note(
            &self,
            id: NoteId,
            payload: &NotePayload,
        ) -> Result<Option<Note>, RemoteError> {
            (**self).update_note(id, payload)
        }
        fn delete_note(&self, id: NoteId) -> Result<(), RemoteError> {
            (**self).delete_note(id)
        }
        fn sync_notes(&self, notes: &[Note]) -> Result<SyncReply, RemoteError> {
            (**self).sync_notes(notes)
        }
    }

    pub fn note(id: i64, title: &str, content: &str) -> Note {
        Note {
            id: NoteId(id),
            title: title.into(),
            content: content.into(),
            category: DEFAULT_CATEGORY.into(),
            reminder_date: None,
            is_pinned: false,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn notebook_at(dir: &Path) -> Notebook {
        Notebook {
            root: dir.to_path_buf(),
            dir: dir.to_path_buf(),
            config: NotebookConfig::default(),
            notes: Vec::new(),
        }
    }

    /// Guest session over a temp dir
    pub fn guest_session(dir: &Path) -> Session {
        let (session, _) =
            Session::start(notebook_at(dir), LocalStore::in_dir(dir), None).unwrap();
        session
    }

    /// Authenticated session talking to `backend`
    pub fn server_session(dir: &Path, backend: std::rc::Rc<FakeBackend>) -> Session {
        let (session, _) = Session::start(
            notebook_at(dir),
            LocalStore::in_dir(dir),
            Some(Box::new(backend)),
        )
        .unwrap();
        session
    }
}
