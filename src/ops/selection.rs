use indexmap::IndexSet;

use crate::model::note::NoteId;

/// Notes ticked for bulk actions, in the order they were ticked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    ids: IndexSet<NoteId>,
}

impl Selection {
    pub fn from_ids(ids: IndexSet<NoteId>) -> Self {
        Selection { ids }
    }

    /// Tick or untick a note. Returns whether it is now selected.
    pub fn toggle(&mut self, id: NoteId) -> bool {
        if self.ids.shift_remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn insert(&mut self, id: NoteId) {
        self.ids.insert(id);
    }

    pub fn remove(&mut self, id: NoteId) -> bool {
        self.ids.shift_remove(&id)
    }

    pub fn contains(&self, id: NoteId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn ids(&self) -> impl Iterator<Item = NoteId> + '_ {
        self.ids.iter().copied()
    }

    pub fn as_set(&self) -> &IndexSet<NoteId> {
        &self.ids
    }

    /// Bulk edit works on exactly one note
    pub fn can_bulk_edit(&self) -> bool {
        self.ids.len() == 1
    }

    /// The selected note when exactly one is selected
    pub fn single(&self) -> Option<NoteId> {
        if self.can_bulk_edit() {
            self.ids.first().copied()
        } else {
            None
        }
    }

    /// Drop ids that no longer name a note
    pub fn prune(&mut self, exists: impl Fn(NoteId) -> bool) {
        self.ids.retain(|id| exists(*id));
    }

    /// `"1 note selected"` / `"3 notes selected"`; `None` when empty
    pub fn summary(&self) -> Option<String> {
        match self.ids.len() {
            0 => None,
            1 => Some("1 note selected".to_string()),
            n => Some(format!("{} notes selected", n)),
        }
    }
}

/// Confirmation asked before a bulk delete
pub fn delete_prompt(count: usize) -> String {
    format!("Delete {} notes?", count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_adds_and_removes() {
        let mut sel = Selection::default();
        assert!(sel.toggle(NoteId(1)));
        assert!(sel.contains(NoteId(1)));
        assert!(!sel.toggle(NoteId(1)));
        assert!(sel.is_empty());
    }

    #[test]
    fn keeps_tick_order() {
        let mut sel = Selection::default();
        sel.toggle(NoteId(30));
        sel.toggle(NoteId(10));
        sel.toggle(NoteId(20));
        sel.toggle(NoteId(10));
        sel.toggle(NoteId(10));
        let ids: Vec<i64> = sel.ids().map(|i| i.0).collect();
        assert_eq!(ids, vec![30, 20, 10]);
    }

    #[test]
    fn summary_pluralizes() {
        let mut sel = Selection::default();
        assert_eq!(sel.summary(), None);
        sel.toggle(NoteId(1));
        assert_eq!(sel.summary().as_deref(), Some("1 note selected"));
        sel.toggle(NoteId(2));
        assert_eq!(sel.summary().as_deref(), Some("2 notes selected"));
    }

    #[test]
    fn bulk_edit_needs_exactly_one() {
        let mut sel = Selection::default();
        assert!(!sel.can_bulk_edit());
        sel.toggle(NoteId(7));
        assert!(sel.can_bulk_edit());
        assert_eq!(sel.single(), Some(NoteId(7)));
        sel.toggle(NoteId(8));
        assert!(!sel.can_bulk_edit());
        assert_eq!(sel.single(), None);
    }

    #[test]
    fn prune_drops_missing() {
        let mut sel = Selection::default();
        sel.toggle(NoteId(1));
        sel.toggle(NoteId(2));
        sel.toggle(NoteId(3));
        sel.prune(|id| id.0 != 2);
        let ids: Vec<i64> = sel.ids().map(|i| i.0).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn delete_prompt_text() {
        assert_eq!(delete_prompt(3), "Delete 3 notes?");
    }
}
