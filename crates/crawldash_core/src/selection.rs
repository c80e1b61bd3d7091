use std::collections::BTreeSet;

use crate::RecordId;

/// Ids picked for bulk operations. Always a subset of the visible page; the
/// owner re-validates it after every re-derivation and clears it on page change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionTracker {
    selected: BTreeSet<RecordId>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select exactly the ids on the current page.
    pub fn select_all(&mut self, page_ids: &[RecordId]) {
        self.selected = page_ids.iter().copied().collect();
    }

    pub fn toggle(&mut self, id: RecordId, included: bool) {
        if included {
            self.selected.insert(id);
        } else {
            self.selected.remove(&id);
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// True iff `page_ids` is non-empty and every id in it is selected.
    pub fn is_all_selected(&self, page_ids: &[RecordId]) -> bool {
        !page_ids.is_empty() && page_ids.iter().all(|id| self.selected.contains(id))
    }

    pub fn is_selected(&self, id: RecordId) -> bool {
        self.selected.contains(&id)
    }

    /// Drop selections that are no longer on the visible page.
    pub fn retain_visible(&mut self, page_ids: &[RecordId]) -> usize {
        let before = self.selected.len();
        self.selected.retain(|id| page_ids.contains(id));
        before - self.selected.len()
    }

    /// Selected ids in the order they appear on the page.
    pub fn in_page_order(&self, page_ids: &[RecordId]) -> Vec<RecordId> {
        page_ids
            .iter()
            .copied()
            .filter(|id| self.selected.contains(id))
            .collect()
    }

    pub fn ids(&self) -> &BTreeSet<RecordId> {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
