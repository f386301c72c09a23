use serde::Serialize;

use crate::model::note::{Note, NoteId, REMINDER_DISPLAY};
use crate::model::notebook::Mode;
use crate::ops::selection::Selection;
use crate::ops::sync::HandoffOutcome;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct NoteJson {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_date: Option<String>,
    pub is_pinned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,
}

#[derive(Serialize)]
pub struct StatusJson {
    pub name: String,
    pub mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    pub notes: usize,
    pub pinned: usize,
    pub selected: Vec<NoteId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<NoteId>,
}

#[derive(Serialize)]
pub struct ExportJson {
    pub id: NoteId,
    pub path: String,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn note_to_json(note: &Note, selection: &Selection) -> NoteJson {
    NoteJson {
        id: note.id,
        title: note.title.clone(),
        content: note.content.clone(),
        category: note.category.clone(),
        reminder_date: note.reminder_string(),
        is_pinned: note.is_pinned,
        created_at: note.created_at.map(|d| d.to_rfc3339()),
        updated_at: note.updated_at.map(|d| d.to_rfc3339()),
        selected: selection.contains(note.id),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// One list row: selection tick, id, pin, title and a content snippet.
/// The current detail note is marked with `>`.
pub fn format_note_line(note: &Note, selected: bool, current: bool) -> String {
    let marker = if current { '>' } else { ' ' };
    let tick = if selected { 'x' } else { ' ' };
    let pin = if note.is_pinned { "📌 " } else { "" };
    format!(
        "{}[{}] {} {}{}  {}",
        marker,
        tick,
        note.id,
        pin,
        note.display_title(),
        note.snippet().replace('\n', " ")
    )
}

/// The detail view of a note
pub fn format_note_detail(note: &Note) -> Vec<String> {
    let mut lines = Vec::new();
    let pin = if note.is_pinned { "📌 " } else { "" };
    lines.push(format!("{}{}", pin, note.display_title()));
    lines.push(format!("Category: {}", note.category));
    if let Some(reminder) = note.reminder_date {
        lines.push(format!("⏰ Reminder: {}", reminder.format(REMINDER_DISPLAY)));
    }
    lines.push(format!("id: {}", note.id));
    lines.push(String::new());
    if note.content.is_empty() {
        lines.push("No content".to_string());
    } else {
        lines.extend(note.content.lines().map(str::to_string));
    }
    lines
}

/// The whole list, or a placeholder when there is nothing to show
pub fn format_note_list<'a>(
    notes: impl IntoIterator<Item = &'a Note>,
    selection: &Selection,
    current: Option<NoteId>,
) -> Vec<String> {
    let lines: Vec<String> = notes
        .into_iter()
        .map(|n| format_note_line(n, selection.contains(n.id), current == Some(n.id)))
        .collect();
    if lines.is_empty() {
        vec!["No notes found.".to_string()]
    } else {
        lines
    }
}

/// One-line report of a handoff, or `None` when there was nothing to say
pub fn format_handoff(outcome: &HandoffOutcome) -> Option<String> {
    match outcome {
        HandoffOutcome::Skipped => None,
        HandoffOutcome::Synced { count, .. } => Some(format!(
            "synced {} local {} to the server",
            count,
            if *count == 1 { "note" } else { "notes" }
        )),
        HandoffOutcome::Restored { error } => Some(format!(
            "sync failed, local notes kept: {}",
            error
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::note::parse_reminder;
    use crate::ops::session::test_support::note;
    use pretty_assertions::assert_eq;

    #[test]
    fn line_marks_selection_pin_and_current() {
        let mut n = note(7, "Groceries", "Milk\neggs");
        assert_eq!(format_note_line(&n, false, false), " [ ] 7 Groceries  Milk eggs");
        n.is_pinned = true;
        assert_eq!(format_note_line(&n, true, true), ">[x] 7 📌 Groceries  Milk eggs");
    }

    #[test]
    fn line_placeholders() {
        let n = note(1, "", "");
        assert_eq!(format_note_line(&n, false, false), " [ ] 1 Untitled  No content");
    }

    #[test]
    fn detail_shows_reminder_only_when_set() {
        let mut n = note(3, "Trip", "Pack\nbags");
        let lines = format_note_detail(&n);
        assert!(!lines.iter().any(|l| l.contains("Reminder")));
        assert_eq!(&lines[lines.len() - 2..], &["Pack", "bags"]);

        n.reminder_date = parse_reminder("2025-08-01T07:30");
        let lines = format_note_detail(&n);
        assert!(lines.contains(&"⏰ Reminder: Fri Aug 1 2025, 07:30".to_string()));
    }

    #[test]
    fn empty_list_placeholder() {
        let lines = format_note_list(std::iter::empty(), &Selection::default(), None);
        assert_eq!(lines, vec!["No notes found."]);
    }

    #[test]
    fn handoff_messages() {
        assert_eq!(format_handoff(&HandoffOutcome::Skipped), None);
        let synced = HandoffOutcome::Synced {
            count: 1,
            notes: vec![],
        };
        assert_eq!(
            format_handoff(&synced).as_deref(),
            Some("synced 1 local note to the server")
        );
    }

    #[test]
    fn json_skips_unset_fields() {
        let n = note(4, "A", "B");
        let json = serde_json::to_value(note_to_json(&n, &Selection::default())).unwrap();
        assert!(json.get("reminder_date").is_none());
        assert!(json.get("selected").is_none());
        assert_eq!(json["category"], "Miscellaneous");
    }
}
