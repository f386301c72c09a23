use regex::Regex;

use crate::model::note::Note;

/// Does `note` match an already-lowercased term? Title and content are
/// checked; an empty term matches everything.
pub fn matches(note: &Note, term_lower: &str) -> bool {
    term_lower.is_empty()
        || note.title.to_lowercase().contains(term_lower)
        || note.content.to_lowercase().contains(term_lower)
}

/// Case-insensitive substring search over title and content, keeping
/// list order.
pub fn search_notes<'a>(notes: &'a [Note], term: &str) -> Vec<&'a Note> {
    let term = term.to_lowercase();
    notes.iter().filter(|n| matches(n, &term)).collect()
}

/// Regex that highlights occurrences of `term` the way `search_notes`
/// matches them. `None` for an empty term.
pub fn highlight_regex(term: &str) -> Option<Regex> {
    if term.is_empty() {
        return None;
    }
    Regex::new(&format!("(?i){}", regex::escape(term))).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::session::test_support::note;

    fn sample() -> Vec<Note> {
        vec![
            note(1, "Groceries", "Milk, eggs"),
            note(2, "Meeting", "Discuss MILK budget"),
            note(3, "Ideas", "a TUI for notes"),
        ]
    }

    #[test]
    fn empty_term_returns_everything() {
        let notes = sample();
        assert_eq!(search_notes(&notes, "").len(), 3);
    }

    #[test]
    fn matches_title_or_content_case_insensitively() {
        let notes = sample();
        let ids: Vec<i64> = search_notes(&notes, "milk").iter().map(|n| n.id.0).collect();
        assert_eq!(ids, vec![1, 2]);
        let ids: Vec<i64> = search_notes(&notes, "IDEA").iter().map(|n| n.id.0).collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn category_is_not_searched() {
        let mut notes = sample();
        notes[2].category = "Work".into();
        assert!(search_notes(&notes, "work").is_empty());
    }

    #[test]
    fn highlight_regex_escapes_and_ignores_case() {
        let re = highlight_regex("a.b").unwrap();
        assert!(re.is_match("xA.By"));
        assert!(!re.is_match("axb"));
        assert!(highlight_regex("").is_none());
    }
}
