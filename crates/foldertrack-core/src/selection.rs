//! Operator selection of records, spanning pages and filters.

use std::collections::{BTreeSet, HashSet};

use crate::RecordId;

/// Set of selected record ids.
///
/// Not required to be a subset of the current filtered view: selections made
/// before a filter narrows the view persist. Whether "everything in view" is
/// selected is never stored; see [`SelectionSet::all_selected`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<RecordId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: RecordId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn contains(&self, id: RecordId) -> bool {
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

    /// Selected ids in ascending order.
    pub fn ids(&self) -> Vec<RecordId> {
        self.ids.iter().copied().collect()
    }

    /// True iff every id of `view` is selected. Vacuously true for an empty view.
    pub fn all_selected<I>(&self, view: I) -> bool
    where
        I: IntoIterator<Item = RecordId>,
    {
        view.into_iter().all(|id| self.ids.contains(&id))
    }

    /// The "select all" control.
    ///
    /// When not everything in `view` is selected, adds every id of the view
    /// (all pages, not just the visible one) to the existing selection.
    /// When everything is already selected, clears the whole selection,
    /// including ids outside the view.
    pub fn toggle_select_all(&mut self, view: &[RecordId]) {
        if self.all_selected(view.iter().copied()) {
            self.ids.clear();
        } else {
            self.ids.extend(view.iter().copied());
        }
    }

    /// Drop ids that no longer exist in a freshly loaded record list.
    /// Returns how many were removed.
    pub fn retain_existing(&mut self, existing: &HashSet<RecordId>) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| existing.contains(id));
        before - self.ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[i64]) -> Vec<RecordId> {
        raw.iter().copied().map(RecordId).collect()
    }

    #[test]
    fn toggle_flips_membership() {
        let mut sel = SelectionSet::new();
        assert!(sel.toggle(RecordId(4)));
        assert!(sel.contains(RecordId(4)));
        assert!(!sel.toggle(RecordId(4)));
        assert!(sel.is_empty());
    }

    #[test]
    fn empty_view_is_vacuously_all_selected() {
        let sel = SelectionSet::new();
        assert!(sel.all_selected(Vec::new()));
    }

    #[test]
    fn all_selected_tracks_view_membership() {
        let mut sel = SelectionSet::new();
        let view = ids(&[1, 2, 3]);
        assert!(!sel.all_selected(view.clone()));
        sel.toggle(RecordId(1));
        sel.toggle(RecordId(2));
        assert!(!sel.all_selected(view.clone()));
        sel.toggle(RecordId(3));
        assert!(sel.all_selected(view.clone()));
        sel.toggle(RecordId(2));
        assert!(!sel.all_selected(view));
    }

    #[test]
    fn select_all_is_additive_to_ids_outside_view() {
        let mut sel = SelectionSet::new();
        sel.toggle(RecordId(99));
        sel.toggle_select_all(&ids(&[1, 2, 3]));
        assert_eq!(sel.ids(), ids(&[1, 2, 3, 99]));
    }

    #[test]
    fn deselect_all_clears_ids_outside_view() {
        let mut sel = SelectionSet::new();
        sel.toggle(RecordId(99));
        let view = ids(&[1, 2]);
        sel.toggle_select_all(&view);
        assert!(sel.all_selected(view.clone()));
        sel.toggle_select_all(&view);
        assert!(sel.is_empty());
    }

    #[test]
    fn select_all_on_empty_view_clears() {
        let mut sel = SelectionSet::new();
        sel.toggle(RecordId(5));
        sel.toggle_select_all(&[]);
        assert!(sel.is_empty());
    }

    #[test]
    fn retain_existing_purges_vanished_ids() {
        let mut sel = SelectionSet::new();
        for id in [1, 2, 3] {
            sel.toggle(RecordId(id));
        }
        let existing: HashSet<RecordId> = ids(&[2, 3, 4]).into_iter().collect();
        assert_eq!(sel.retain_existing(&existing), 1);
        assert_eq!(sel.ids(), ids(&[2, 3]));
    }
}
