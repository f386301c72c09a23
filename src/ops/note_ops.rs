use chrono::{DateTime, Utc};

use crate::io::notebook_io::NotebookError;
use crate::io::remote::RemoteError;
use crate::model::note::{Note, NoteDraft, NoteId, NotePatch, display_order, normalize_category};
use crate::ops::session::Session;

/// Error type for note operations
#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    #[error("Title or content is required.")]
    Blank,
    #[error("note not found: {0}")]
    NotFound(NoteId),
    #[error("note not saved: {0}")]
    NotSaved(#[source] RemoteError),
    #[error(transparent)]
    Notebook(#[from] NotebookError),
}

/// Pinned first, then most recently updated first
pub fn sort_notes(notes: &mut [Note]) {
    notes.sort_by(display_order);
}

/// A millisecond-timestamp id not yet used in `notes`
pub fn next_guest_id(notes: &[Note], now: DateTime<Utc>) -> NoteId {
    let mut candidate = now.timestamp_millis();
    while notes.iter().any(|n| n.id.0 == candidate) {
        candidate += 1;
    }
    NoteId(candidate)
}

/// Create or update a note. See [`save_note_at`].
pub fn save_note(session: &mut Session, draft: NoteDraft) -> Result<NoteId, NoteError> {
    save_note_at(session, draft, Utc::now())
}

/// Create (`draft.id == None`) or update a note.
///
/// Authenticated creates wait for the server's id and store nothing if the
/// server refuses. Authenticated updates are applied locally first; a failed
/// server update is only logged. Guest saves rewrite the local store.
/// The list is re-sorted and the saved note becomes the detail note.
pub fn save_note_at(
    session: &mut Session,
    draft: NoteDraft,
    now: DateTime<Utc>,
) -> Result<NoteId, NoteError> {
    let draft = draft.trimmed();
    if draft.is_blank() {
        return Err(NoteError::Blank);
    }

    let notes = &mut session.notebook.notes;
    let id = match (draft.id, session.backend.as_deref()) {
        (None, Some(backend)) => match backend.create_note(&draft.to_payload()) {
            Ok(note) => {
                let id = note.id;
                notes.retain(|n| n.id != id);
                notes.insert(0, note);
                id
            }
            Err(e) => {
                tracing::error!(error = %e, "error creating note");
                return Err(NoteError::NotSaved(e));
            }
        },
        (Some(id), Some(backend)) => {
            let note = notes
                .iter_mut()
                .find(|n| n.id == id)
                .ok_or(NoteError::NotFound(id))?;
            note.apply_draft(&draft);
            note.updated_at = Some(now);
            let payload = note.to_draft().to_payload();
            if let Err(e) = backend.update_note(id, &payload) {
                tracing::error!(%id, error = %e, "error updating note");
            }
            id
        }
        (None, None) => {
            let id = next_guest_id(notes, now);
            notes.insert(
                0,
                Note {
                    id,
                    title: draft.title,
                    content: draft.content,
                    category: normalize_category(&draft.category),
                    reminder_date: draft.reminder_date,
                    is_pinned: draft.is_pinned,
                    created_at: Some(now),
                    updated_at: Some(now),
                },
            );
            session.store.save(notes)?;
            id
        }
        (Some(id), None) => {
            let note = notes
                .iter_mut()
                .find(|n| n.id == id)
                .ok_or(NoteError::NotFound(id))?;
            note.apply_draft(&draft);
            note.updated_at = Some(now);
            session.store.save(notes)?;
            id
        }
    };

    sort_notes(&mut session.notebook.notes);
    session.current = Some(id);
    Ok(id)
}

/// Apply a partial edit to an existing note
pub fn edit_note(session: &mut Session, id: NoteId, patch: &NotePatch) -> Result<NoteId, NoteError> {
    let note = session.find(id).ok_or(NoteError::NotFound(id))?;
    let draft = patch.apply_to(note.to_draft());
    save_note(session, draft)
}

/// Pin or unpin a note
pub fn set_pinned(session: &mut Session, id: NoteId, pinned: bool) -> Result<NoteId, NoteError> {
    edit_note(
        session,
        id,
        &NotePatch {
            is_pinned: Some(pinned),
            ..Default::default()
        },
    )
}

/// Remove a note. A failed server delete is only logged; the note is gone
/// from this session either way.
pub fn delete_note(session: &mut Session, id: NoteId) -> Result<Note, NoteError> {
    let pos = session
        .notebook
        .position(id)
        .ok_or(NoteError::NotFound(id))?;
    let removed = session.notebook.notes.remove(pos);

    match session.backend.as_deref() {
        Some(backend) => {
            if let Err(e) = backend.delete_note(id) {
                tracing::error!(%id, error = %e, "error deleting note");
            }
        }
        None => session.store.save(&session.notebook.notes)?,
    }

    if session.current == Some(id) {
        session.current = None;
    }
    session.selection.remove(id);
    Ok(removed)
}

/// Delete every selected note, then clear the selection.
pub fn bulk_delete(session: &mut Session) -> Result<Vec<Note>, NoteError> {
    let ids: Vec<NoteId> = session.selection.ids().collect();
    let mut removed = Vec::with_capacity(ids.len());
    for id in ids {
        match delete_note(session, id) {
            Ok(note) => removed.push(note),
            Err(NoteError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }
    }
    session.selection.clear();
    Ok(removed)
}

/// The note a bulk edit opens: only when exactly one is selected.
/// Opening the editor clears the selection.
pub fn take_bulk_edit_target(session: &mut Session) -> Option<NoteId> {
    let id = session.selection.single()?;
    session.selection.clear();
    Some(id)
}

/// Show a note in the detail view
pub fn show_note(session: &mut Session, id: NoteId) -> Result<&Note, NoteError> {
    if !session.notebook.contains(id) {
        session.current = None;
        return Err(NoteError::NotFound(id));
    }
    session.current = Some(id);
    session.find(id).ok_or(NoteError::NotFound(id))
}
