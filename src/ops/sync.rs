use crate::io::local_store::LocalStore;
use crate::io::notebook_io::NotebookError;
use crate::io::remote::NoteBackend;
use crate::model::note::Note;

/// What happened to the guest notes when an authenticated session started
#[derive(Debug, Clone, PartialEq)]
pub enum HandoffOutcome {
    /// No guest notes were waiting
    Skipped,
    /// The server took them; `notes` is its full post-merge list
    Synced { count: usize, notes: Vec<Note> },
    /// The upload failed and the guest notes were put back
    Restored { error: String },
}

impl HandoffOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, HandoffOutcome::Restored { .. })
    }
}

/// Hand guest notes over to the server in one batch.
///
/// The store is cleared before the request goes out so the same notes are
/// never uploaded twice; if the upload fails the file is written back byte
/// for byte. The server's reply replaces the caller's list wholesale.
pub fn handoff(
    store: &LocalStore,
    backend: &dyn NoteBackend,
) -> Result<HandoffOutcome, NotebookError> {
    let raw = store.read_raw()?;
    let local = store.load()?;
    if local.is_empty() {
        tracing::debug!("no local notes to sync");
        return Ok(HandoffOutcome::Skipped);
    }

    store.clear()?;

    match backend.sync_notes(&local) {
        Ok(reply) => {
            tracing::info!(
                synced = reply.synced_count,
                total = reply.cloud_notes.len(),
                "synced local notes to server"
            );
            Ok(HandoffOutcome::Synced {
                count: reply.synced_count,
                notes: reply.cloud_notes,
            })
        }
        Err(e) => {
            tracing::error!(error = %e, count = local.len(), "sync failed, restoring local notes");
            match &raw {
                Some(bytes) => store.write_raw(bytes)?,
                None => store.save(&local)?,
            }
            Ok(HandoffOutcome::Restored {
                error: e.to_string(),
            })
        }
    }
}
