//! The browser session: one owner for the record store, query, filtered
//! view, selection, page window and pending bulk action.
//!
//! Every mutation that changes the query or the base record list recomputes
//! the filtered view and resets the page; everything derived from the view
//! (visible slice, "all selected") is computed on demand.

use std::collections::HashSet;

use crate::bulk::{BulkAction, PendingAction};
use crate::filter::filtered_indices;
use crate::pagination::PageWindow;
use crate::selection::SelectionSet;
use crate::{CaseManager, Purpose, Record, RecordId};

#[derive(Debug, Clone, Default)]
pub struct BrowserSession {
    pub(crate) records: Vec<Record>,
    pub(crate) case_managers: Vec<CaseManager>,
    pub(crate) purposes: Vec<Purpose>,
    pub(crate) query: String,
    /// Indices into `records`, recomputed on every query/base-list change.
    pub(crate) view: Vec<usize>,
    pub(crate) selection: SelectionSet,
    pub(crate) page: PageWindow,
    /// Row cursor within the visible page.
    pub(crate) cursor: usize,
    pub(crate) pending: PendingAction,
    pub(crate) in_flight: Option<BulkAction>,
}

impl BrowserSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the base record list (initial load or re-fetch).
    ///
    /// Selected ids that no longer exist are dropped. Returns how many.
    pub fn replace_records(&mut self, records: Vec<Record>) -> usize {
        self.records = records;
        let existing: HashSet<RecordId> = self.records.iter().map(|r| r.id).collect();
        let purged = self.selection.retain_existing(&existing);
        if purged > 0 {
            tracing::debug!(purged, "dropped selections for records no longer present");
        }
        self.refilter();
        purged
    }

    pub fn set_case_managers(&mut self, case_managers: Vec<CaseManager>) {
        self.case_managers = case_managers;
        if let Some(id) = self.pending.case_manager
            && !self.case_managers.iter().any(|c| c.id == id)
        {
            self.pending.case_manager = None;
        }
    }

    pub fn set_purposes(&mut self, purposes: Vec<Purpose>) {
        self.purposes = purposes;
        if let Some(id) = self.pending.purpose
            && !self.purposes.iter().any(|p| p.id == id)
        {
            self.pending.purpose = None;
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn case_managers(&self) -> &[CaseManager] {
        &self.case_managers
    }

    pub fn purposes(&self) -> &[Purpose] {
        &self.purposes
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Overwrite the query (typed or dictated). Recomputes the view when it
    /// changed.
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if query != self.query {
            self.query = query;
            self.refilter();
        }
    }

    fn refilter(&mut self) {
        self.view = filtered_indices(&self.records, &self.query);
        self.page.reset();
        self.cursor = 0;
    }

    /// Number of records in the filtered view.
    pub fn view_len(&self) -> usize {
        self.view.len()
    }

    /// Ids of the whole filtered view (every page).
    pub fn view_ids(&self) -> Vec<RecordId> {
        self.view.iter().map(|&i| self.records[i].id).collect()
    }

    /// Records on the current page.
    pub fn visible_records(&self) -> Vec<&Record> {
        self.page
            .slice(&self.view)
            .iter()
            .map(|&i| &self.records[i])
            .collect()
    }

    pub fn current_page(&self) -> usize {
        self.page.current()
    }

    pub fn total_pages(&self) -> usize {
        self.page.total_pages(self.view.len())
    }

    pub fn has_prev_page(&self) -> bool {
        self.page.has_prev()
    }

    pub fn has_next_page(&self) -> bool {
        self.page.has_next(self.view.len())
    }

    pub fn next_page(&mut self) -> bool {
        let moved = self.page.next(self.view.len());
        if moved {
            self.cursor = 0;
        }
        moved
    }

    pub fn prev_page(&mut self) -> bool {
        let moved = self.page.prev();
        if moved {
            self.cursor = 0;
        }
        moved
    }

    pub fn first_page(&mut self) {
        self.page.reset();
        self.cursor = 0;
    }

    pub fn last_page(&mut self) {
        self.page.last(self.view.len());
        self.cursor = 0;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn visible_len(&self) -> usize {
        self.page.range(self.view.len()).len()
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.visible_len() {
            self.cursor += 1;
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_record(&self) -> Option<&Record> {
        let range = self.page.range(self.view.len());
        let idx = range.start + self.cursor;
        if idx < range.end {
            self.view.get(idx).map(|&i| &self.records[i])
        } else {
            None
        }
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn is_selected(&self, id: RecordId) -> bool {
        self.selection.contains(id)
    }

    /// Flip selection of any record id, visible or not.
    pub fn toggle(&mut self, id: RecordId) -> bool {
        self.selection.toggle(id)
    }

    /// Flip selection of the record under the cursor.
    pub fn toggle_cursor(&mut self) -> Option<bool> {
        let id = self.cursor_record()?.id;
        Some(self.selection.toggle(id))
    }

    /// Derived state of the "select all" control for the current view.
    pub fn all_selected(&self) -> bool {
        self.selection
            .all_selected(self.view.iter().map(|&i| self.records[i].id))
    }

    pub fn toggle_select_all(&mut self) {
        let view = self.view_ids();
        self.selection.toggle_select_all(&view);
    }

    pub fn pending(&self) -> &PendingAction {
        &self.pending
    }

    pub fn selected_case_manager(&self) -> Option<&CaseManager> {
        let id = self.pending.case_manager?;
        self.case_managers.iter().find(|c| c.id == id)
    }

    pub fn selected_purpose(&self) -> Option<&Purpose> {
        let id = self.pending.purpose?;
        self.purposes.iter().find(|p| p.id == id)
    }

    /// Choose a case manager by id; unknown ids leave the choice unset.
    pub fn choose_case_manager(&mut self, id: Option<i64>) {
        self.pending.case_manager = id.filter(|id| self.case_managers.iter().any(|c| c.id == *id));
    }

    /// Choose a purpose by id; unknown ids leave the choice unset.
    pub fn choose_purpose(&mut self, id: Option<i64>) {
        self.pending.purpose = id.filter(|id| self.purposes.iter().any(|p| p.id == *id));
    }

    /// Step through unset → first … last → unset.
    pub fn cycle_case_manager(&mut self, forward: bool) {
        let ids: Vec<i64> = self.case_managers.iter().map(|c| c.id).collect();
        self.pending.case_manager = cycle_choice(&ids, self.pending.case_manager, forward);
    }

    pub fn cycle_purpose(&mut self, forward: bool) {
        let ids: Vec<i64> = self.purposes.iter().map(|p| p.id).collect();
        self.pending.purpose = cycle_choice(&ids, self.pending.purpose, forward);
    }
}

fn cycle_choice(ids: &[i64], current: Option<i64>, forward: bool) -> Option<i64> {
    if ids.is_empty() {
        return None;
    }
    // Position 0 is "unset", 1..=len map to ids.
    let slots = ids.len() + 1;
    let pos = current
        .and_then(|id| ids.iter().position(|&x| x == id))
        .map(|p| p + 1)
        .unwrap_or(0);
    let next = if forward {
        (pos + 1) % slots
    } else {
        (pos + slots - 1) % slots
    };
    if next == 0 { None } else { Some(ids[next - 1]) }
}
