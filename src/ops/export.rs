use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::note::Note;

/// Plain-text body of a downloaded note
pub fn export_text(note: &Note) -> String {
    format!(
        "Title: {}\nCategory: {}\nReminder: {}\n\nContent:\n{}",
        note.title,
        note.category,
        note.reminder_string().as_deref().unwrap_or("None"),
        note.content
    )
}

/// File stem for a note: every character outside `[A-Za-z0-9]` becomes `_`.
pub fn file_stem(title: &str) -> String {
    if title.is_empty() {
        return "Untitled_Note".to_string();
    }
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// First free `stem.txt`, `stem (1).txt`, `stem (2).txt`, … in `dir`
fn free_path(dir: &Path, stem: &str) -> PathBuf {
    let first = dir.join(format!("{}.txt", stem));
    if !first.exists() {
        return first;
    }
    (1..)
        .map(|n| dir.join(format!("{} ({}).txt", stem, n)))
        .find(|p| !p.exists())
        .unwrap_or(first)
}

/// Write one note into `dir` without overwriting anything. Returns the path.
pub fn export_note(note: &Note, dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = free_path(dir, &file_stem(&note.title));
    fs::write(&path, export_text(note))?;
    tracing::debug!(id = %note.id, path = %path.display(), "exported note");
    Ok(path)
}

/// Export several notes into `dir`, in the given order.
pub fn export_notes<'a>(
    notes: impl IntoIterator<Item = &'a Note>,
    dir: &Path,
) -> io::Result<Vec<PathBuf>> {
    notes.into_iter().map(|n| export_note(n, dir)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::note::parse_reminder;
    use crate::ops::session::test_support::note;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn text_layout() {
        let mut n = note(1, "Trip", "Pack bags");
        n.category = "Personal".into();
        n.reminder_date = parse_reminder("2025-08-01T07:30");
        assert_eq!(
            export_text(&n),
            "Title: Trip\nCategory: Personal\nReminder: 2025-08-01T07:30\n\nContent:\nPack bags"
        );
    }

    #[test]
    fn text_without_reminder() {
        let n = note(1, "", "");
        assert!(export_text(&n).contains("Reminder: None\n"));
    }

    #[test]
    fn stem_replaces_non_alphanumerics() {
        assert_eq!(file_stem("Shopping list: week 3!"), "Shopping_list__week_3_");
        assert_eq!(file_stem("café"), "caf_");
        assert_eq!(file_stem(""), "Untitled_Note");
    }

    #[test]
    fn never_overwrites() {
        let tmp = TempDir::new().unwrap();
        let a = note(1, "Same", "first");
        let b = note(2, "Same", "second");
        let c = note(3, "Same", "third");

        let paths = export_notes([&a, &b, &c], tmp.path()).unwrap();

        let names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["Same.txt", "Same (1).txt", "Same (2).txt"]);
        assert!(fs::read_to_string(&paths[0]).unwrap().ends_with("first"));
        assert!(fs::read_to_string(&paths[2]).unwrap().ends_with("third"));
    }
}
